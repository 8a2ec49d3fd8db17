//! Events API payloads.
//!
//! # Hierarchy
//!
//! ```text
//! EventPayload                  ← outer "type"
//! ├── UrlVerification { challenge }
//! ├── EventCallback { team_id, event_id, event: CallbackEvent }
//! │   └── CallbackEvent         ← inner "type"
//! │       ├── AppHomeOpened
//! │       ├── AppMention
//! │       ├── Message(MessageEvent)
//! │       └── Other
//! ├── AppRateLimited
//! └── Other
//! ```

use serde::{Deserialize, Serialize};

/// An Events API request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    UrlVerification(UrlVerification),
    EventCallback(EventCallback),
    AppRateLimited(AppRateLimited),
    /// Any outer event type this crate does not model.
    #[serde(other)]
    Other,
}

impl EventPayload {
    /// Returns the `type` string for this payload.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::UrlVerification(_) => "url_verification",
            Self::EventCallback(_) => "event_callback",
            Self::AppRateLimited(_) => "app_rate_limited",
            Self::Other => "other",
        }
    }
}

/// The endpoint verification handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlVerification {
    #[serde(default)]
    pub token: Option<String>,
    pub challenge: String,
}

/// Sent when a workspace exceeds the event rate limit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRateLimited {
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub minute_rate_limited: i64,
}

/// Wrapper around every subscribed workspace event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCallback {
    #[serde(default)]
    pub team_id: String,
    #[serde(default)]
    pub api_app_id: String,
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub event_time: i64,
    pub event: CallbackEvent,
}

impl EventCallback {
    /// Wraps an inner event with empty metadata.
    pub fn new(event: CallbackEvent) -> Self {
        Self {
            team_id: String::new(),
            api_app_id: String::new(),
            event_id: String::new(),
            event_time: 0,
            event,
        }
    }
}

/// The inner event of an [`EventCallback`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallbackEvent {
    AppHomeOpened(AppHomeOpened),
    AppMention(AppMention),
    Message(MessageEvent),
    /// Any inner event type this crate does not model.
    #[serde(other)]
    Other,
}

/// A user opened the app's home tab or messages tab.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppHomeOpened {
    pub user: String,
    pub channel: String,
    /// `"home"` or `"messages"`.
    pub tab: String,
    pub event_ts: String,
}

/// The app was mentioned in a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMention {
    pub user: String,
    pub channel: String,
    pub text: String,
    pub ts: String,
}

/// A message was posted somewhere the app can see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageEvent {
    pub user: Option<String>,
    pub channel: String,
    pub text: String,
    pub ts: String,
    pub channel_type: Option<String>,
    pub subtype: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_callback() {
        let raw = r#"{
            "type": "event_callback",
            "team_id": "T1",
            "event_id": "Ev1",
            "event": {"type": "app_home_opened", "user": "U1", "tab": "messages"}
        }"#;
        let payload: EventPayload = serde_json::from_str(raw).unwrap();
        let EventPayload::EventCallback(callback) = payload else {
            panic!("expected event callback");
        };
        assert_eq!(callback.team_id, "T1");
        assert_eq!(
            callback.event,
            CallbackEvent::AppHomeOpened(AppHomeOpened {
                user: "U1".into(),
                tab: "messages".into(),
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_parse_url_verification() {
        let payload: EventPayload =
            serde_json::from_str(r#"{"type":"url_verification","challenge":"abc"}"#).unwrap();
        assert_eq!(payload.type_name(), "url_verification");
    }

    #[test]
    fn test_unknown_inner_event() {
        let raw = r#"{"type":"event_callback","event":{"type":"reaction_added"}}"#;
        let payload: EventPayload = serde_json::from_str(raw).unwrap();
        let EventPayload::EventCallback(callback) = payload else {
            panic!("expected event callback");
        };
        assert_eq!(callback.event, CallbackEvent::Other);
    }
}
