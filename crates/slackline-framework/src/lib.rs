//! # Slackline Framework
//!
//! Ready-made handlers and interceptors on top of `slackline-core`.
//!
//! This layer provides:
//! - Payload handlers with optional checks ([`On`]) and grouped handlers
//!   ([`Grouped`])
//! - Typed error handlers ([`OnError`], [`CatchAllErrors`])
//! - Builder functions for common patterns (`on_command`, `on_block_actions`,
//!   `catch_all`, ...)
//! - Modal trees with recursive dispatch ([`ModalNode`], [`ModalStack`])
//! - Tracing and error-logging interceptors
//!
//! Nothing here is required by the pipeline; any type implementing the core
//! traits can be registered directly.

pub mod handler;
pub mod interceptor;
pub mod modal;
pub mod routing;

pub use handler::{
    CatchAllErrors, GroupCheck, Grouped, On, OnError, PayloadCheck, PayloadHandler,
    TypedErrorHandler,
};
pub use interceptor::{ErrorLoggingInterceptor, TracingInterceptor};
pub use modal::{
    MODAL_ROUTE_KEY, Modal, ModalConverter, ModalId, ModalMode, ModalNode, ModalResult,
    ModalRoute, ModalScope, ModalStack, UpdateCheck, ViewClient,
};
pub use routing::{
    ErrorFilter, PayloadFilter, catch_all, catch_all_errors, on, on_block_actions, on_command,
    on_error,
};
