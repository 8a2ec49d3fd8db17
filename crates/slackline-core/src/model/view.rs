//! Views and the responses a handler can produce for them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{ApiError, ApiResult};

// ============================================================================
// View
// ============================================================================

/// A modal (or home tab) view definition.
///
/// Blocks are kept as raw JSON; the pipeline never inspects them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// View type, `"modal"` unless stated otherwise.
    #[serde(rename = "type", default = "default_view_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Identifier matched against modal nodes on submission.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default)]
    pub blocks: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_metadata: Option<String>,
    /// Submitted input values (only present on submissions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Value>,
}

fn default_view_type() -> String {
    "modal".to_string()
}

impl View {
    /// Creates an empty modal view with the given callback id.
    pub fn modal(callback_id: impl Into<String>) -> Self {
        Self {
            kind: default_view_type(),
            id: None,
            callback_id: Some(callback_id.into()),
            title: None,
            blocks: Vec::new(),
            private_metadata: None,
            state: None,
        }
    }

    /// Sets a plain-text title.
    pub fn with_title(mut self, text: impl Into<String>) -> Self {
        self.title = Some(json!({ "type": "plain_text", "text": text.into() }));
        self
    }

    /// Appends a block.
    pub fn with_block(mut self, block: Value) -> Self {
        self.blocks.push(block);
        self
    }

    /// Sets the private metadata string.
    pub fn with_private_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.private_metadata = Some(metadata.into());
        self
    }
}

// ============================================================================
// ResponseAction
// ============================================================================

/// The synchronous answer to a view submission.
///
/// Serializes with a `response_action` tag:
///
/// ```text
/// {"response_action":"push","view":{...}}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "response_action", rename_all = "snake_case")]
pub enum ResponseAction {
    /// Close every view in the modal stack.
    Clear,
    /// Replace the submitted view.
    Update { view: View },
    /// Push a new view on top of the submitted one.
    Push { view: View },
    /// Show validation errors keyed by block id.
    Errors { errors: BTreeMap<String, String> },
}

impl ResponseAction {
    /// Creates an [`ResponseAction::Errors`] with a single entry.
    pub fn error(block_id: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(block_id.into(), message.into());
        Self::Errors { errors }
    }
}

// ============================================================================
// WebApiResponse
// ============================================================================

/// Generic Web API response envelope (`{"ok": true, ...}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebApiResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Method-specific fields (e.g. the returned `view`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WebApiResponse {
    /// A successful response with no extra fields.
    pub fn success() -> Self {
        Self {
            ok: true,
            ..Default::default()
        }
    }

    /// A failed response carrying the platform error code.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    /// Converts `ok: false` into an [`ApiError::Platform`].
    pub fn into_result(self) -> ApiResult<Self> {
        if self.ok {
            Ok(self)
        } else {
            Err(ApiError::Platform(
                self.error.unwrap_or_else(|| "unknown_error".to_string()),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_action_wire_format() {
        let push = ResponseAction::Push {
            view: View::modal("second"),
        };
        let json = serde_json::to_value(&push).unwrap();
        assert_eq!(json["response_action"], "push");
        assert_eq!(json["view"]["callback_id"], "second");

        let clear = serde_json::to_value(ResponseAction::Clear).unwrap();
        assert_eq!(clear, json!({ "response_action": "clear" }));
    }

    #[test]
    fn test_web_api_response_into_result() {
        assert!(WebApiResponse::success().into_result().is_ok());

        let err = WebApiResponse::failure("expired_trigger_id")
            .into_result()
            .unwrap_err();
        assert_eq!(err.to_string(), "API error: expired_trigger_id");
    }

    #[test]
    fn test_web_api_response_keeps_extra_fields() {
        let resp: WebApiResponse =
            serde_json::from_str(r#"{"ok":true,"view":{"id":"V1"}}"#).unwrap();
        assert!(resp.ok);
        assert_eq!(resp.extra["view"]["id"], "V1");
    }
}
