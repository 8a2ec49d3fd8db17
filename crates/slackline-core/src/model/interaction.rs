//! Interactive component payloads.
//!
//! # Hierarchy
//!
//! ```text
//! InteractionPayload            ← "type" discriminates
//! ├── BlockActions(BlockActionsPayload)
//! ├── ViewSubmission(ViewSubmissionPayload)
//! ├── ViewClosed(ViewClosedPayload)
//! ├── Shortcut(ShortcutPayload)
//! ├── MessageAction(ShortcutPayload)
//! └── Other
//! ```

use serde::{Deserialize, Serialize};

use super::view::View;

/// The user who triggered an interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
}

/// A single action inside a `block_actions` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadAction {
    pub action_id: String,
    #[serde(default)]
    pub block_id: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

impl PayloadAction {
    /// Creates an action with the given id.
    pub fn new(action_id: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            ..Default::default()
        }
    }
}

/// Payload for `block_actions` interactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockActionsPayload {
    #[serde(default)]
    pub trigger_id: String,
    #[serde(default)]
    pub user: Option<UserSummary>,
    #[serde(default)]
    pub actions: Vec<PayloadAction>,
    /// The view the actions happened in, when they came from a modal.
    #[serde(default)]
    pub view: Option<View>,
    #[serde(default)]
    pub response_url: Option<String>,
}

impl BlockActionsPayload {
    /// Creates a payload carrying the given action ids.
    pub fn with_actions<I, S>(action_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            actions: action_ids.into_iter().map(PayloadAction::new).collect(),
            ..Default::default()
        }
    }

    /// Returns `true` if any action has one of the given ids.
    pub fn has_any_action<S: AsRef<str>>(&self, action_ids: &[S]) -> bool {
        self.actions
            .iter()
            .any(|a| action_ids.iter().any(|id| id.as_ref() == a.action_id))
    }
}

/// Payload for `view_submission` interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSubmissionPayload {
    #[serde(default)]
    pub trigger_id: String,
    #[serde(default)]
    pub user: Option<UserSummary>,
    pub view: View,
}

impl ViewSubmissionPayload {
    /// Creates a submission of the given view.
    pub fn new(view: View) -> Self {
        Self {
            trigger_id: String::new(),
            user: None,
            view,
        }
    }
}

/// Payload for `view_closed` interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewClosedPayload {
    #[serde(default)]
    pub user: Option<UserSummary>,
    pub view: View,
    #[serde(default)]
    pub is_cleared: bool,
}

/// Payload for global shortcuts and message actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutPayload {
    #[serde(default)]
    pub callback_id: String,
    #[serde(default)]
    pub trigger_id: String,
    #[serde(default)]
    pub user: Option<UserSummary>,
}

/// Any interactive component payload, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionPayload {
    BlockActions(BlockActionsPayload),
    ViewSubmission(ViewSubmissionPayload),
    ViewClosed(ViewClosedPayload),
    Shortcut(ShortcutPayload),
    MessageAction(ShortcutPayload),
    /// Any interaction type this crate does not model.
    #[serde(other)]
    Other,
}

impl InteractionPayload {
    /// Returns the `type` string for this payload.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::BlockActions(_) => "block_actions",
            Self::ViewSubmission(_) => "view_submission",
            Self::ViewClosed(_) => "view_closed",
            Self::Shortcut(_) => "shortcut",
            Self::MessageAction(_) => "message_action",
            Self::Other => "other",
        }
    }

    /// Returns the trigger id, when the payload carries one.
    pub fn trigger_id(&self) -> Option<&str> {
        match self {
            Self::BlockActions(p) => Some(&p.trigger_id),
            Self::ViewSubmission(p) => Some(&p.trigger_id),
            Self::Shortcut(p) | Self::MessageAction(p) => Some(&p.trigger_id),
            Self::ViewClosed(_) | Self::Other => None,
        }
        .map(String::as_str)
        .filter(|id| !id.is_empty())
    }
}

impl From<BlockActionsPayload> for InteractionPayload {
    fn from(payload: BlockActionsPayload) -> Self {
        Self::BlockActions(payload)
    }
}

impl From<ViewSubmissionPayload> for InteractionPayload {
    fn from(payload: ViewSubmissionPayload) -> Self {
        Self::ViewSubmission(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_submission() {
        let raw = r#"{
            "type": "view_submission",
            "trigger_id": "T1",
            "user": {"id": "U1"},
            "view": {"type": "modal", "callback_id": "signup", "blocks": []}
        }"#;
        let payload: InteractionPayload = serde_json::from_str(raw).unwrap();
        let InteractionPayload::ViewSubmission(sub) = payload else {
            panic!("expected view submission");
        };
        assert_eq!(sub.view.callback_id.as_deref(), Some("signup"));
        assert_eq!(sub.trigger_id, "T1");
    }

    #[test]
    fn test_parse_unknown_interaction_type() {
        let payload: InteractionPayload =
            serde_json::from_str(r#"{"type":"workflow_step_edit"}"#).unwrap();
        assert_eq!(payload, InteractionPayload::Other);
    }

    #[test]
    fn test_trigger_id() {
        let submission: InteractionPayload = serde_json::from_str(
            r#"{"type":"view_submission","trigger_id":"T1","view":{"type":"modal"}}"#,
        )
        .unwrap();
        assert_eq!(submission.trigger_id(), Some("T1"));

        let blank: InteractionPayload =
            serde_json::from_str(r#"{"type":"block_actions","trigger_id":""}"#).unwrap();
        assert_eq!(blank.trigger_id(), None);
        assert_eq!(InteractionPayload::Other.trigger_id(), None);
    }

    #[test]
    fn test_has_any_action() {
        let payload = BlockActionsPayload::with_actions(["next", "back"]);
        assert!(payload.has_any_action(&["back"]));
        assert!(!payload.has_any_action(&["cancel"]));
        assert!(!payload.has_any_action::<&str>(&[]));
    }
}
