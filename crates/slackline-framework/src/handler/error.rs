//! Error handlers keyed on the error type.

use std::error::Error as StdError;
use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;

use slackline_core::{BoxError, ErrorHandler, HandlerError, HandlerResult, SlackContext};

/// Handles one error type.
///
/// Implemented for closures taking `&E`. The returned future may not borrow
/// the error, so copy what you need first:
///
/// ```rust,ignore
/// on_error::<ApiError>().handler(|e: &ApiError| {
///     let reason = e.to_string();
///     async move { Ok::<_, BoxError>(format!("slack said no: {reason}")) }
/// })
/// ```
#[async_trait]
pub trait TypedErrorHandler<E: ?Sized, R>: Send + Sync {
    async fn handle_error(&self, error: &E, ctx: &mut SlackContext) -> HandlerResult<R>;
}

#[async_trait]
impl<E, R, F, Fut> TypedErrorHandler<E, R> for F
where
    E: Sync + ?Sized + 'static,
    R: Send + 'static,
    F: Fn(&E) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult<R>> + Send,
{
    async fn handle_error(&self, error: &E, _ctx: &mut SlackContext) -> HandlerResult<R> {
        (self)(error).await
    }
}

/// Accepts errors that downcast to `E`.
pub struct OnError<E, H> {
    handler: H,
    _error: PhantomData<fn() -> E>,
}

impl<E, H> OnError<E, H> {
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler,
            _error: PhantomData,
        }
    }
}

#[async_trait]
impl<E, H, R> ErrorHandler<R> for OnError<E, H>
where
    E: StdError + Send + Sync + 'static,
    H: TypedErrorHandler<E, R>,
    R: Send + 'static,
{
    async fn can_handle(&self, _ctx: &mut SlackContext, error: &BoxError) -> bool {
        error.is::<E>()
    }

    async fn handle(&self, ctx: &mut SlackContext, error: &BoxError) -> HandlerResult<R> {
        let typed = error
            .downcast_ref::<E>()
            .ok_or_else(HandlerError::unexpected_error::<E>)?;
        self.handler.handle_error(typed, ctx).await
    }

    fn name(&self) -> &str {
        std::any::type_name::<E>()
    }
}

/// Accepts every error.
pub struct CatchAllErrors<H> {
    handler: H,
}

impl<H> CatchAllErrors<H> {
    pub(crate) fn new(handler: H) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<H, R> ErrorHandler<R> for CatchAllErrors<H>
where
    H: TypedErrorHandler<BoxError, R>,
    R: Send + 'static,
{
    async fn can_handle(&self, _ctx: &mut SlackContext, _error: &BoxError) -> bool {
        true
    }

    async fn handle(&self, ctx: &mut SlackContext, error: &BoxError) -> HandlerResult<R> {
        self.handler.handle_error(error, ctx).await
    }

    fn name(&self) -> &str {
        "catch_all_errors"
    }
}
