//! The inbound request model.
//!
//! Only the fields the dispatch layer and the bundled handler families need
//! are modelled; everything else on the wire is ignored.

mod command;
mod envelope;
mod event;
mod interaction;
mod request;
mod view;

pub use command::{SlashCommand, normalize_command};
pub use envelope::{Envelope, EnvelopeType};
pub use event::{
    AppHomeOpened, AppMention, AppRateLimited, CallbackEvent, EventCallback, EventPayload,
    MessageEvent, UrlVerification,
};
pub use interaction::{
    BlockActionsPayload, InteractionPayload, PayloadAction, ShortcutPayload, UserSummary,
    ViewClosedPayload, ViewSubmissionPayload,
};
pub use request::{Payload, RequestKind, SlackRequest};
pub use view::{ResponseAction, View, WebApiResponse};
