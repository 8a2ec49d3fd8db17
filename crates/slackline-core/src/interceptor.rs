//! Interceptor chains.
//!
//! Interceptors wrap the invocation of the selected handler. A chain is an
//! ordered slice of interceptors plus the terminal handler; the cursor types
//! [`Next`] and [`ErrorNext`] point at "the rest of the chain".
//!
//! ```text
//!   interceptor 1 ──▶ interceptor 2 ──▶ ... ──▶ handler
//!        ◀──────────────◀──────────────◀─────────┘
//! ```
//!
//! Each interceptor runs code before and after `next.run(ctx)`, giving onion
//! ordering in registration order. Skipping `next.run` short-circuits the
//! rest of the chain. Cursors are consumed by value, so the remainder runs at
//! most once per interceptor.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::context::SlackContext;
use crate::error::{BoxError, HandlerResult};
use crate::handler::{ErrorHandler, RequestHandler};

// ============================================================================
// Request chain
// ============================================================================

/// Wraps the invocation of the selected request handler.
///
/// # Example
///
/// ```rust,ignore
/// struct Timing;
///
/// #[async_trait]
/// impl<R: Send + 'static> RequestInterceptor<R> for Timing {
///     async fn intercept(
///         &self,
///         ctx: &mut SlackContext,
///         _handler: &dyn RequestHandler<R>,
///         next: Next<'_, R>,
///     ) -> HandlerResult<R> {
///         let start = Instant::now();
///         let result = next.run(ctx).await;
///         debug!(elapsed = ?start.elapsed(), "handled");
///         result
///     }
/// }
/// ```
#[async_trait]
pub trait RequestInterceptor<R>: Send + Sync {
    async fn intercept(
        &self,
        ctx: &mut SlackContext,
        handler: &dyn RequestHandler<R>,
        next: Next<'_, R>,
    ) -> HandlerResult<R>;
}

/// Cursor over the remainder of a request chain.
pub struct Next<'a, R> {
    interceptors: &'a [Arc<dyn RequestInterceptor<R>>],
    handler: &'a dyn RequestHandler<R>,
}

impl<'a, R: Send + 'static> Next<'a, R> {
    /// Creates a cursor at the start of `interceptors`, ending in `handler`.
    pub fn new(
        interceptors: &'a [Arc<dyn RequestInterceptor<R>>],
        handler: &'a dyn RequestHandler<R>,
    ) -> Self {
        Self {
            interceptors,
            handler,
        }
    }

    /// Number of interceptors left before the handler.
    pub fn remaining(&self) -> usize {
        self.interceptors.len()
    }

    /// Runs the rest of the chain, including the terminal handler.
    pub fn run<'b>(self, ctx: &'b mut SlackContext) -> BoxFuture<'b, HandlerResult<R>>
    where
        'a: 'b,
    {
        match self.interceptors.split_first() {
            Some((first, rest)) => first.intercept(
                ctx,
                self.handler,
                Next {
                    interceptors: rest,
                    handler: self.handler,
                },
            ),
            None => self.handler.handle(ctx),
        }
    }
}

// ============================================================================
// Error chain
// ============================================================================

/// Wraps the invocation of the selected error handler.
///
/// `request_handler` is the request handler selected in the first phase, or
/// `None` when the error is [`HandlerNotFound`](crate::HandlerNotFound).
#[async_trait]
pub trait ErrorInterceptor<R>: Send + Sync {
    async fn intercept(
        &self,
        ctx: &mut SlackContext,
        request_handler: Option<&dyn RequestHandler<R>>,
        error_handler: &dyn ErrorHandler<R>,
        error: &BoxError,
        next: ErrorNext<'_, R>,
    ) -> HandlerResult<R>;
}

/// Cursor over the remainder of an error chain.
pub struct ErrorNext<'a, R> {
    interceptors: &'a [Arc<dyn ErrorInterceptor<R>>],
    request_handler: Option<&'a dyn RequestHandler<R>>,
    error_handler: &'a dyn ErrorHandler<R>,
    error: &'a BoxError,
}

impl<'a, R: Send + 'static> ErrorNext<'a, R> {
    /// Creates a cursor at the start of `interceptors`, ending in
    /// `error_handler`.
    pub fn new(
        interceptors: &'a [Arc<dyn ErrorInterceptor<R>>],
        request_handler: Option<&'a dyn RequestHandler<R>>,
        error_handler: &'a dyn ErrorHandler<R>,
        error: &'a BoxError,
    ) -> Self {
        Self {
            interceptors,
            request_handler,
            error_handler,
            error,
        }
    }

    /// Number of interceptors left before the error handler.
    pub fn remaining(&self) -> usize {
        self.interceptors.len()
    }

    /// Runs the rest of the chain, including the terminal error handler.
    pub fn run<'b>(self, ctx: &'b mut SlackContext) -> BoxFuture<'b, HandlerResult<R>>
    where
        'a: 'b,
    {
        match self.interceptors.split_first() {
            Some((first, rest)) => first.intercept(
                ctx,
                self.request_handler,
                self.error_handler,
                self.error,
                ErrorNext {
                    interceptors: rest,
                    ..self
                },
            ),
            None => self.error_handler.handle(ctx, self.error),
        }
    }
}
