//! Builder functions for the common handler shapes.
//!
//! Each function returns a filter that is finished with `.handler(...)`:
//!
//! ```rust,ignore
//! use slackline::prelude::*;
//!
//! let pipeline = Pipeline::new()
//!     .handler(on_command("weather").handler(weather))
//!     .handler(on::<AppHomeOpened>().when(|e| e.tab == "home").handler(home))
//!     .handler(on_block_actions(["refresh"]).handler(refresh))
//!     .handler(catch_all(fallback))
//!     .error_handler(on_error::<ApiError>().handler(api_failed))
//!     .error_handler(catch_all_errors(apologise));
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use slackline_core::Payload;
use slackline_core::model::{BlockActionsPayload, SlackRequest, SlashCommand, normalize_command};

use crate::handler::{CatchAllErrors, On, OnError, PayloadCheck};

/// A pending [`On`] handler: a payload type plus an optional check.
pub struct PayloadFilter<P> {
    check: Option<PayloadCheck<P>>,
}

impl<P: Payload> PayloadFilter<P> {
    /// Adds a check on the extracted payload. Replaces any previous check.
    pub fn when<F>(mut self, check: F) -> Self
    where
        F: Fn(&P) -> bool + Send + Sync + 'static,
    {
        self.check = Some(Arc::new(check));
        self
    }

    /// Finishes the filter with the handler to invoke.
    pub fn handler<H>(self, handler: H) -> On<P, H> {
        On::new(self.check, handler)
    }
}

/// Accepts requests carrying a `P`.
pub fn on<P: Payload>() -> PayloadFilter<P> {
    PayloadFilter { check: None }
}

/// Accepts the slash command `command`. The leading `/` is optional.
pub fn on_command(command: impl Into<String>) -> PayloadFilter<SlashCommand> {
    let command = normalize_command(command.into());
    on::<SlashCommand>().when(move |cmd| cmd.command == command)
}

/// Accepts `block_actions` interactions containing any of `action_ids`.
pub fn on_block_actions<I, S>(action_ids: I) -> PayloadFilter<BlockActionsPayload>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let action_ids: Vec<String> = action_ids.into_iter().map(Into::into).collect();
    on::<BlockActionsPayload>().when(move |payload| payload.has_any_action(&action_ids))
}

/// Accepts every request.
pub fn catch_all<H>(handler: H) -> On<SlackRequest, H> {
    on::<SlackRequest>().handler(handler).named("catch_all")
}

/// A pending [`OnError`] handler.
pub struct ErrorFilter<E> {
    _error: PhantomData<fn() -> E>,
}

impl<E> ErrorFilter<E> {
    /// Finishes the filter with the handler to invoke.
    pub fn handler<H>(self, handler: H) -> OnError<E, H> {
        OnError::new(handler)
    }
}

/// Accepts errors that downcast to `E`.
pub fn on_error<E>() -> ErrorFilter<E> {
    ErrorFilter {
        _error: PhantomData,
    }
}

/// Accepts every error.
pub fn catch_all_errors<H>(handler: H) -> CatchAllErrors<H> {
    CatchAllErrors::new(handler)
}
