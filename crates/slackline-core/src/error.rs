//! Error types for the slackline pipeline.
//!
//! Handlers, interceptors and the pipeline itself all return
//! [`HandlerResult`], whose error side is a type-erased [`BoxError`]. Errors
//! travel through the pipeline untouched, so an error handler (or the final
//! caller) can always recover the concrete type with
//! [`downcast_ref`](std::error::Error) or `is::<T>()`.
//!
//! The pipeline raises two errors of its own:
//!
//! - [`HandlerNotFound`] when no request handler accepts the request.
//! - [`PreconditionError`] when a `process*` entry point is called without a
//!   request or envelope. These are never routed to error handlers.

use thiserror::Error;

use crate::model::RequestKind;

pub use tower::BoxError;

/// Result type returned by handlers, interceptors and the pipeline.
pub type HandlerResult<T> = Result<T, BoxError>;

// =============================================================================
// Pipeline errors
// =============================================================================

/// Raised when no request handler accepts the current request.
///
/// The pipeline recognises this error when deciding whether to consult error
/// handlers (see
/// [`PipelineOptions::request_handler_triggers_error_handlers`](crate::PipelineOptions)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no matching request handler found")]
pub struct HandlerNotFound;

/// A `process*` entry point was called without its input.
///
/// This is a programming error and is returned before any handler is queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PreconditionError {
    /// `process_envelope` was called with no envelope.
    #[error("envelope is required")]
    MissingEnvelope,

    /// `process` was called with no request.
    #[error("slack request is required")]
    MissingRequest,
}

// =============================================================================
// Handler errors
// =============================================================================

/// Errors raised by the built-in handler families.
#[derive(Debug, Clone, Error)]
pub enum HandlerError {
    /// The handler was invoked for a request it cannot read.
    ///
    /// Only happens when `handle` is called without a preceding successful
    /// `can_handle` on the same context.
    #[error("unexpected request: expected {expected}, got '{got}'")]
    UnexpectedRequest {
        /// Description of the payload the handler expected.
        expected: &'static str,
        /// Kind of the request actually received.
        got: RequestKind,
    },

    /// A typed error handler was invoked for an error of another type.
    #[error("unexpected error: expected {expected}")]
    UnexpectedError {
        /// Type name of the error the handler expected.
        expected: &'static str,
    },

    /// A routing handler was asked to handle a request it never selected.
    #[error("no selection recorded for '{key}'")]
    NotSelected {
        /// Scratch-map key the selection should have been stored under.
        key: String,
    },
}

impl HandlerError {
    /// Creates an [`HandlerError::UnexpectedRequest`].
    pub fn unexpected(expected: &'static str, got: RequestKind) -> Self {
        Self::UnexpectedRequest { expected, got }
    }

    /// Creates a [`HandlerError::UnexpectedError`] naming `E`.
    pub fn unexpected_error<E>() -> Self {
        Self::UnexpectedError {
            expected: std::any::type_name::<E>(),
        }
    }

    /// Creates a [`HandlerError::NotSelected`].
    pub fn not_selected(key: impl Into<String>) -> Self {
        Self::NotSelected { key: key.into() }
    }
}

// =============================================================================
// API errors
// =============================================================================

/// Error type for calls made through an outbound API client.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The API call timed out.
    #[error("API call timed out")]
    Timeout,

    /// The platform answered with `ok: false`.
    #[error("API error: {0}")]
    Platform(String),

    /// Failed to serialize/deserialize.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
