//! Request and error handler contracts.
//!
//! Both contracts are a capability pair: a predicate (`can_handle`) and the
//! handling itself (`handle`). The pipeline only calls `handle` on a value
//! whose `can_handle` returned `true` for the same [`SlackContext`], so a
//! handler may record routing state in the context during `can_handle` and
//! read it back in `handle`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::SlackContext;
use crate::error::{BoxError, HandlerResult};

/// A handler for inbound requests producing a response of type `R`.
///
/// # Example
///
/// ```rust,ignore
/// struct Pong;
///
/// #[async_trait]
/// impl RequestHandler<String> for Pong {
///     async fn can_handle(&self, ctx: &mut SlackContext) -> bool {
///         ctx.payload::<SlashCommand>().is_some_and(|c| c.command == "/ping")
///     }
///
///     async fn handle(&self, _ctx: &mut SlackContext) -> HandlerResult<String> {
///         Ok("pong".into())
///     }
/// }
/// ```
#[async_trait]
pub trait RequestHandler<R>: Send + Sync {
    /// Returns whether this handler accepts the request.
    ///
    /// The only permitted mutation of `ctx` is recording state for the
    /// matching [`handle`](Self::handle) call.
    async fn can_handle(&self, ctx: &mut SlackContext) -> bool;

    /// Handles a request previously accepted by [`can_handle`](Self::can_handle).
    async fn handle(&self, ctx: &mut SlackContext) -> HandlerResult<R>;

    /// Name used in log output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A handler for errors raised while processing a request.
#[async_trait]
pub trait ErrorHandler<R>: Send + Sync {
    /// Returns whether this handler accepts the error.
    async fn can_handle(&self, ctx: &mut SlackContext, error: &BoxError) -> bool;

    /// Produces a response for an error accepted by
    /// [`can_handle`](Self::can_handle).
    async fn handle(&self, ctx: &mut SlackContext, error: &BoxError) -> HandlerResult<R>;

    /// Name used in log output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

#[async_trait]
impl<R, H> RequestHandler<R> for Arc<H>
where
    H: RequestHandler<R> + ?Sized,
    R: 'static,
{
    async fn can_handle(&self, ctx: &mut SlackContext) -> bool {
        (**self).can_handle(ctx).await
    }

    async fn handle(&self, ctx: &mut SlackContext) -> HandlerResult<R> {
        (**self).handle(ctx).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[async_trait]
impl<R, H> ErrorHandler<R> for Arc<H>
where
    H: ErrorHandler<R> + ?Sized,
    R: 'static,
{
    async fn can_handle(&self, ctx: &mut SlackContext, error: &BoxError) -> bool {
        (**self).can_handle(ctx, error).await
    }

    async fn handle(&self, ctx: &mut SlackContext, error: &BoxError) -> HandlerResult<R> {
        (**self).handle(ctx, error).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
