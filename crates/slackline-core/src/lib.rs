//! # Slackline Core
//!
//! The dispatch engine of the slackline framework.
//!
//! This crate provides the building blocks every other slackline crate uses:
//!
//! - **Request model**: the typed inbound request ([`SlackRequest`]), its
//!   socket-mode [`Envelope`], and typed payload extraction ([`Payload`]).
//! - **Context**: per-request state ([`SlackContext`]) with a scratch map
//!   ([`Items`]) and an opaque caller tag.
//! - **Contracts**: [`RequestHandler`] and [`ErrorHandler`].
//! - **Interceptor chains**: [`RequestInterceptor`] / [`Next`] and
//!   [`ErrorInterceptor`] / [`ErrorNext`].
//! - **Pipeline**: first-match selection and two-phase dispatch
//!   ([`Pipeline`]).
//!
//! ## Request flow
//!
//! ```text
//! ┌──────────┐   ┌──────────────┐   ┌─────────────────┐   ┌─────────┐
//! │ Envelope │──▶│ SlackRequest │──▶│ first can_handle │──▶│ handler │
//! └──────────┘   └──────────────┘   └─────────────────┘   └─────────┘
//!                                           │ error
//!                                           ▼
//!                                   ┌───────────────┐
//!                                   │ error handler │
//!                                   └───────────────┘
//! ```

pub mod context;
pub mod error;
pub mod handler;
pub mod interceptor;
pub mod model;
pub mod pipeline;

pub use context::{ENVELOPE_KEY, Items, SlackContext, Tag};
pub use error::{
    ApiError, ApiResult, BoxError, HandlerError, HandlerNotFound, HandlerResult,
    PreconditionError,
};
pub use futures::future::BoxFuture;
pub use handler::{ErrorHandler, RequestHandler};
pub use interceptor::{ErrorInterceptor, ErrorNext, Next, RequestInterceptor};
pub use model::{Envelope, EnvelopeType, Payload, RequestKind, SlackRequest};
pub use pipeline::{Pipeline, PipelineOptions};

/// Prelude for common imports.
pub mod prelude {
    pub use super::context::{SlackContext, Tag};
    pub use super::error::{BoxError, HandlerResult};
    pub use super::handler::{ErrorHandler, RequestHandler};
    pub use super::interceptor::{ErrorInterceptor, ErrorNext, Next, RequestInterceptor};
    pub use super::model::*;
    pub use super::pipeline::{Pipeline, PipelineOptions};
}
