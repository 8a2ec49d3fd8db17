//! The typed inbound request and typed payload extraction.
//!
//! A [`SlackRequest`] is a closed enum over the request families the
//! platform delivers. Handlers that care about one payload type go through
//! [`Payload::extract`], which borrows the payload out of the request when
//! the request has that shape:
//!
//! ```rust,ignore
//! use slackline_core::model::{BlockActionsPayload, Payload};
//!
//! if let Some(actions) = BlockActionsPayload::extract(ctx.request()) {
//!     println!("{} actions", actions.actions.len());
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::command::SlashCommand;
use super::event::{
    AppHomeOpened, AppMention, CallbackEvent, EventCallback, EventPayload, MessageEvent,
    UrlVerification,
};
use super::interaction::{
    BlockActionsPayload, InteractionPayload, ShortcutPayload, ViewClosedPayload,
    ViewSubmissionPayload,
};

// ============================================================================
// RequestKind
// ============================================================================

/// The discriminant of a [`SlackRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Unknown,
    SlashCommand,
    Interaction,
    Event,
}

impl RequestKind {
    /// Returns the snake_case name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::SlashCommand => "slash_command",
            Self::Interaction => "interaction",
            Self::Event => "event",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SlackRequest
// ============================================================================

/// An inbound request, already adapted from its transport envelope.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SlackRequest {
    /// A request whose payload could not be classified.
    #[default]
    Unknown,
    SlashCommand(SlashCommand),
    Interaction(InteractionPayload),
    Event(EventPayload),
}

impl SlackRequest {
    /// Returns the kind of this request.
    pub fn kind(&self) -> RequestKind {
        match self {
            Self::Unknown => RequestKind::Unknown,
            Self::SlashCommand(_) => RequestKind::SlashCommand,
            Self::Interaction(_) => RequestKind::Interaction,
            Self::Event(_) => RequestKind::Event,
        }
    }

    pub fn as_slash_command(&self) -> Option<&SlashCommand> {
        match self {
            Self::SlashCommand(cmd) => Some(cmd),
            _ => None,
        }
    }

    pub fn as_interaction(&self) -> Option<&InteractionPayload> {
        match self {
            Self::Interaction(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn as_event(&self) -> Option<&EventPayload> {
        match self {
            Self::Event(payload) => Some(payload),
            _ => None,
        }
    }

    /// Returns a short, human readable description used in log fields.
    pub fn describe(&self) -> String {
        match self {
            Self::Unknown => "unknown".to_string(),
            Self::SlashCommand(cmd) => format!("slash_command:{}", cmd.command),
            Self::Interaction(payload) => format!("interaction:{}", payload.type_name()),
            Self::Event(EventPayload::EventCallback(callback)) => {
                format!("event:event_callback:{}", callback_type_name(&callback.event))
            }
            Self::Event(payload) => format!("event:{}", payload.type_name()),
        }
    }
}

fn callback_type_name(event: &CallbackEvent) -> &'static str {
    match event {
        CallbackEvent::AppHomeOpened(_) => "app_home_opened",
        CallbackEvent::AppMention(_) => "app_mention",
        CallbackEvent::Message(_) => "message",
        CallbackEvent::Other => "other",
    }
}

impl From<SlashCommand> for SlackRequest {
    fn from(cmd: SlashCommand) -> Self {
        Self::SlashCommand(cmd)
    }
}

impl From<InteractionPayload> for SlackRequest {
    fn from(payload: InteractionPayload) -> Self {
        Self::Interaction(payload)
    }
}

impl From<BlockActionsPayload> for SlackRequest {
    fn from(payload: BlockActionsPayload) -> Self {
        Self::Interaction(InteractionPayload::BlockActions(payload))
    }
}

impl From<ViewSubmissionPayload> for SlackRequest {
    fn from(payload: ViewSubmissionPayload) -> Self {
        Self::Interaction(InteractionPayload::ViewSubmission(payload))
    }
}

impl From<EventPayload> for SlackRequest {
    fn from(payload: EventPayload) -> Self {
        Self::Event(payload)
    }
}

impl From<EventCallback> for SlackRequest {
    fn from(callback: EventCallback) -> Self {
        Self::Event(EventPayload::EventCallback(callback))
    }
}

impl From<UrlVerification> for SlackRequest {
    fn from(verification: UrlVerification) -> Self {
        Self::Event(EventPayload::UrlVerification(verification))
    }
}

// ============================================================================
// Payload extraction
// ============================================================================

/// A typed view of a [`SlackRequest`].
///
/// Implemented for the request itself (always extracts) and for every payload
/// type the model defines, at every level of nesting.
pub trait Payload: Send + Sync + 'static {
    /// Description used in [`HandlerError::UnexpectedRequest`](crate::HandlerError).
    const DESCRIPTION: &'static str;

    /// Borrows `Self` out of the request, if the request has this shape.
    fn extract(request: &SlackRequest) -> Option<&Self>;
}

impl Payload for SlackRequest {
    const DESCRIPTION: &'static str = "any request";

    fn extract(request: &SlackRequest) -> Option<&Self> {
        Some(request)
    }
}

impl Payload for SlashCommand {
    const DESCRIPTION: &'static str = "slash command";

    fn extract(request: &SlackRequest) -> Option<&Self> {
        request.as_slash_command()
    }
}

impl Payload for InteractionPayload {
    const DESCRIPTION: &'static str = "interaction";

    fn extract(request: &SlackRequest) -> Option<&Self> {
        request.as_interaction()
    }
}

impl Payload for EventPayload {
    const DESCRIPTION: &'static str = "event";

    fn extract(request: &SlackRequest) -> Option<&Self> {
        request.as_event()
    }
}

/// Implements [`Payload`] for a variant nested under another payload.
macro_rules! nested_payload {
    ($ty:ty, $desc:literal, |$req:ident| $body:expr) => {
        impl Payload for $ty {
            const DESCRIPTION: &'static str = $desc;

            fn extract($req: &SlackRequest) -> Option<&Self> {
                $body
            }
        }
    };
}

nested_payload!(BlockActionsPayload, "block_actions interaction", |request| {
    match request.as_interaction()? {
        InteractionPayload::BlockActions(p) => Some(p),
        _ => None,
    }
});

nested_payload!(ViewSubmissionPayload, "view_submission interaction", |request| {
    match request.as_interaction()? {
        InteractionPayload::ViewSubmission(p) => Some(p),
        _ => None,
    }
});

nested_payload!(ViewClosedPayload, "view_closed interaction", |request| {
    match request.as_interaction()? {
        InteractionPayload::ViewClosed(p) => Some(p),
        _ => None,
    }
});

nested_payload!(ShortcutPayload, "shortcut interaction", |request| {
    match request.as_interaction()? {
        InteractionPayload::Shortcut(p) | InteractionPayload::MessageAction(p) => Some(p),
        _ => None,
    }
});

nested_payload!(UrlVerification, "url_verification event", |request| {
    match request.as_event()? {
        EventPayload::UrlVerification(p) => Some(p),
        _ => None,
    }
});

nested_payload!(EventCallback, "event_callback event", |request| {
    match request.as_event()? {
        EventPayload::EventCallback(p) => Some(p),
        _ => None,
    }
});

nested_payload!(CallbackEvent, "callback event", |request| {
    EventCallback::extract(request).map(|callback| &callback.event)
});

nested_payload!(AppHomeOpened, "app_home_opened callback event", |request| {
    match CallbackEvent::extract(request)? {
        CallbackEvent::AppHomeOpened(e) => Some(e),
        _ => None,
    }
});

nested_payload!(AppMention, "app_mention callback event", |request| {
    match CallbackEvent::extract(request)? {
        CallbackEvent::AppMention(e) => Some(e),
        _ => None,
    }
});

nested_payload!(MessageEvent, "message callback event", |request| {
    match CallbackEvent::extract(request)? {
        CallbackEvent::Message(e) => Some(e),
        _ => None,
    }
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::View;

    #[test]
    fn test_kind_and_describe() {
        let request = SlackRequest::from(SlashCommand::new("weather"));
        assert_eq!(request.kind(), RequestKind::SlashCommand);
        assert_eq!(request.describe(), "slash_command:/weather");
        assert_eq!(SlackRequest::Unknown.kind(), RequestKind::Unknown);
    }

    #[test]
    fn test_nested_extraction() {
        let request = SlackRequest::from(EventCallback::new(CallbackEvent::AppHomeOpened(
            AppHomeOpened {
                tab: "home".into(),
                ..Default::default()
            },
        )));

        assert!(EventPayload::extract(&request).is_some());
        assert!(EventCallback::extract(&request).is_some());
        assert_eq!(AppHomeOpened::extract(&request).unwrap().tab, "home");
        assert!(AppMention::extract(&request).is_none());
        assert!(SlashCommand::extract(&request).is_none());
        assert!(SlackRequest::extract(&request).is_some());
    }

    #[test]
    fn test_interaction_extraction() {
        let request = SlackRequest::from(ViewSubmissionPayload::new(View::modal("a")));
        assert!(ViewSubmissionPayload::extract(&request).is_some());
        assert!(BlockActionsPayload::extract(&request).is_none());
        assert!(InteractionPayload::extract(&request).is_some());
    }

    #[test]
    fn test_nothing_extracts_from_unknown() {
        let request = SlackRequest::Unknown;
        assert!(InteractionPayload::extract(&request).is_none());
        assert!(EventPayload::extract(&request).is_none());
        assert!(SlashCommand::extract(&request).is_none());
    }
}
