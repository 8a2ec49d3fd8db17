//! Socket-mode envelopes and their adaptation into [`SlackRequest`]s.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::request::SlackRequest;

/// The `type` of a socket-mode envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeType {
    Hello,
    EventsApi,
    SlashCommands,
    Interactive,
    Disconnect,
    #[serde(other)]
    #[default]
    Unknown,
}

/// A socket-mode envelope as received on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub envelope_id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: EnvelopeType,
    /// The raw request body, adapted lazily by [`Envelope::to_request`].
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub accepts_response_payload: bool,
    #[serde(default)]
    pub retry_attempt: Option<u32>,
    #[serde(default)]
    pub retry_reason: Option<String>,
}

impl Envelope {
    /// Creates an envelope of the given type around a raw payload.
    pub fn new(kind: EnvelopeType, payload: Value) -> Self {
        Self {
            kind,
            payload,
            ..Default::default()
        }
    }

    /// Sets the envelope id (builder style).
    pub fn with_id(mut self, envelope_id: impl Into<String>) -> Self {
        self.envelope_id = Some(envelope_id.into());
        self
    }

    /// Parses an envelope from its JSON text.
    pub fn parse(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Adapts the payload into a typed request.
    ///
    /// Envelope types that carry no request, and payloads that fail to
    /// deserialize, adapt to [`SlackRequest::Unknown`].
    pub fn to_request(&self) -> SlackRequest {
        let adapted = match self.kind {
            EnvelopeType::EventsApi => {
                serde_json::from_value(self.payload.clone()).map(SlackRequest::Event)
            }
            EnvelopeType::SlashCommands => {
                serde_json::from_value(self.payload.clone()).map(SlackRequest::SlashCommand)
            }
            EnvelopeType::Interactive => {
                serde_json::from_value(self.payload.clone()).map(SlackRequest::Interaction)
            }
            EnvelopeType::Hello | EnvelopeType::Disconnect | EnvelopeType::Unknown => {
                return SlackRequest::Unknown;
            }
        };

        adapted.unwrap_or_else(|e| {
            debug!(
                envelope_id = ?self.envelope_id,
                kind = ?self.kind,
                error = %e,
                "Envelope payload did not adapt, treating as unknown"
            );
            SlackRequest::Unknown
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{BlockActionsPayload, Payload, RequestKind, SlashCommand};

    #[test]
    fn test_parse_interactive_envelope() {
        let raw = r#"{
            "envelope_id": "e1",
            "type": "interactive",
            "accepts_response_payload": true,
            "payload": {"type": "block_actions", "actions": [{"action_id": "go"}]}
        }"#;
        let envelope = Envelope::parse(raw).unwrap();
        assert_eq!(envelope.kind, EnvelopeType::Interactive);
        assert!(envelope.accepts_response_payload);

        let request = envelope.to_request();
        let actions = BlockActionsPayload::extract(&request).unwrap();
        assert!(actions.has_any_action(&["go"]));
    }

    #[test]
    fn test_slash_command_envelope() {
        let envelope = Envelope::new(
            EnvelopeType::SlashCommands,
            json!({"command": "/weather", "text": "london"}),
        );
        let request = envelope.to_request();
        assert_eq!(
            SlashCommand::extract(&request).map(|c| c.text.as_str()),
            Some("london")
        );
    }

    #[test]
    fn test_unknown_type_and_bad_payload_adapt_to_unknown() {
        let hello = Envelope::parse(r#"{"type":"hello"}"#).unwrap();
        assert_eq!(hello.to_request().kind(), RequestKind::Unknown);

        let odd = Envelope::parse(r#"{"type":"something_new"}"#).unwrap();
        assert_eq!(odd.kind, EnvelopeType::Unknown);

        let untyped = Envelope::parse("{}").unwrap();
        assert_eq!(untyped.kind, EnvelopeType::Unknown);

        let broken = Envelope::new(EnvelopeType::Interactive, json!(42));
        assert_eq!(broken.to_request(), SlackRequest::Unknown);
    }
}
