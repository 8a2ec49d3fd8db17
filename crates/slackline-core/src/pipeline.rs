//! The request pipeline.
//!
//! A [`Pipeline`] owns four ordered lists: request handlers, error handlers,
//! request interceptors and error interceptors. Every `process*` call runs
//! two phases:
//!
//! 1. **Handle.** The first request handler whose `can_handle` accepts is
//!    selected (later handlers are never queried) and invoked through the
//!    request interceptor chain. No match raises [`HandlerNotFound`].
//! 2. **Recover.** Entered on any error from phase 1. The first error handler
//!    whose `can_handle` accepts the error is invoked through the error
//!    interceptor chain. When escalation of [`HandlerNotFound`] is disabled,
//!    when no error handlers are registered, or when none accepts, the
//!    original error is returned unchanged.
//!
//! # Example
//!
//! ```rust,ignore
//! use slackline_core::{Pipeline, SlackRequest};
//!
//! let pipeline = Pipeline::<String>::new()
//!     .handler(weather_command)
//!     .handler(home_tab)
//!     .error_handler(apologise)
//!     .interceptor(timing);
//!
//! let response = pipeline.process(request).await?;
//! ```
//!
//! Pipelines are cheap to clone. Builder methods on a shared pipeline copy
//! the lists first, so requests already in flight never observe the change.

use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tower::Service;
use tracing::{Instrument, Level, debug, span, trace};

use crate::context::{ENVELOPE_KEY, SlackContext, Tag};
use crate::error::{BoxError, HandlerNotFound, HandlerResult, PreconditionError};
use crate::handler::{ErrorHandler, RequestHandler};
use crate::interceptor::{ErrorInterceptor, ErrorNext, Next, RequestInterceptor};
use crate::model::{Envelope, SlackRequest};

// ============================================================================
// Options
// ============================================================================

/// Behavioural switches for a [`Pipeline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Whether [`HandlerNotFound`] is offered to the error handlers.
    ///
    /// When `false` it is always returned to the caller as is.
    pub request_handler_triggers_error_handlers: bool,

    /// Name used in log output.
    pub name: Option<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            request_handler_triggers_error_handlers: true,
            name: None,
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// An ordered set of handlers and interceptors producing responses of type `R`.
pub struct Pipeline<R> {
    inner: Arc<PipelineInner<R>>,
}

struct PipelineInner<R> {
    handlers: Vec<Arc<dyn RequestHandler<R>>>,
    error_handlers: Vec<Arc<dyn ErrorHandler<R>>>,
    interceptors: Vec<Arc<dyn RequestInterceptor<R>>>,
    error_interceptors: Vec<Arc<dyn ErrorInterceptor<R>>>,
    options: PipelineOptions,
}

impl<R> Clone for PipelineInner<R> {
    fn clone(&self) -> Self {
        Self {
            handlers: self.handlers.clone(),
            error_handlers: self.error_handlers.clone(),
            interceptors: self.interceptors.clone(),
            error_interceptors: self.error_interceptors.clone(),
            options: self.options.clone(),
        }
    }
}

impl<R> Clone for Pipeline<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Send + 'static> Default for Pipeline<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Send + 'static> Pipeline<R> {
    /// Creates an empty pipeline with default options.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(PipelineInner {
                handlers: Vec::new(),
                error_handlers: Vec::new(),
                interceptors: Vec::new(),
                error_interceptors: Vec::new(),
                options: PipelineOptions::default(),
            }),
        }
    }

    fn inner_mut(&mut self) -> &mut PipelineInner<R> {
        Arc::make_mut(&mut self.inner)
    }

    /// Replaces the pipeline options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.inner_mut().options = options;
        self
    }

    /// Sets whether [`HandlerNotFound`] is offered to the error handlers.
    pub fn request_handler_triggers_error_handlers(mut self, enabled: bool) -> Self {
        self.inner_mut()
            .options
            .request_handler_triggers_error_handlers = enabled;
        self
    }

    /// Sets the name used in log output.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner_mut().options.name = Some(name.into());
        self
    }

    /// Appends a request handler.
    pub fn handler<H>(self, handler: H) -> Self
    where
        H: RequestHandler<R> + 'static,
    {
        self.handler_arc(Arc::new(handler))
    }

    /// Appends a shared request handler.
    pub fn handler_arc(mut self, handler: Arc<dyn RequestHandler<R>>) -> Self {
        self.inner_mut().handlers.push(handler);
        self
    }

    /// Appends an error handler.
    pub fn error_handler<H>(mut self, handler: H) -> Self
    where
        H: ErrorHandler<R> + 'static,
    {
        self.inner_mut().error_handlers.push(Arc::new(handler));
        self
    }

    /// Appends a request interceptor. The first one registered is outermost.
    pub fn interceptor<I>(mut self, interceptor: I) -> Self
    where
        I: RequestInterceptor<R> + 'static,
    {
        self.inner_mut().interceptors.push(Arc::new(interceptor));
        self
    }

    /// Appends an error interceptor. The first one registered is outermost.
    pub fn error_interceptor<I>(mut self, interceptor: I) -> Self
    where
        I: ErrorInterceptor<R> + 'static,
    {
        self.inner_mut().error_interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.inner.options
    }

    pub fn handler_count(&self) -> usize {
        self.inner.handlers.len()
    }

    pub fn error_handler_count(&self) -> usize {
        self.inner.error_handlers.len()
    }

    fn display_name(&self) -> &str {
        self.inner.options.name.as_deref().unwrap_or("unnamed")
    }

    // ------------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------------

    /// Processes a typed request.
    ///
    /// Passing `None` fails with [`PreconditionError::MissingRequest`] before
    /// any handler is queried.
    pub async fn process(&self, request: impl Into<Option<SlackRequest>>) -> HandlerResult<R> {
        self.process_with_tag(request, None).await
    }

    /// Processes a typed request with a caller tag attached to the context.
    pub async fn process_with_tag(
        &self,
        request: impl Into<Option<SlackRequest>>,
        tag: Option<Tag>,
    ) -> HandlerResult<R> {
        let Some(request) = request.into() else {
            return Err(PreconditionError::MissingRequest.into());
        };

        let mut ctx = SlackContext::new(request).with_tag(tag);
        self.dispatch(&mut ctx).await
    }

    /// Processes a socket-mode envelope.
    ///
    /// The envelope is adapted into a request and also stored in the context
    /// under [`ENVELOPE_KEY`]. Passing `None` fails with
    /// [`PreconditionError::MissingEnvelope`] before any handler is queried.
    pub async fn process_envelope(
        &self,
        envelope: impl Into<Option<Envelope>>,
    ) -> HandlerResult<R> {
        self.process_envelope_with_tag(envelope, None).await
    }

    /// Processes a socket-mode envelope with a caller tag attached to the
    /// context.
    pub async fn process_envelope_with_tag(
        &self,
        envelope: impl Into<Option<Envelope>>,
        tag: Option<Tag>,
    ) -> HandlerResult<R> {
        let Some(envelope) = envelope.into() else {
            return Err(PreconditionError::MissingEnvelope.into());
        };

        let mut ctx = SlackContext::new(envelope.to_request()).with_tag(tag);
        ctx.items_mut().insert(ENVELOPE_KEY, envelope);
        self.dispatch(&mut ctx).await
    }

    /// Runs both phases against an existing context.
    pub async fn dispatch(&self, ctx: &mut SlackContext) -> HandlerResult<R> {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            pipeline = %self.display_name(),
            request = %ctx.request().describe()
        );

        async move {
            let selected = self.select(ctx).await;
            let outcome = match selected {
                Some(handler) => {
                    Next::new(&self.inner.interceptors, handler)
                        .run(ctx)
                        .await
                }
                None => Err(HandlerNotFound.into()),
            };

            match outcome {
                Ok(response) => Ok(response),
                Err(error) => self.recover(ctx, selected, error).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn select(&self, ctx: &mut SlackContext) -> Option<&dyn RequestHandler<R>> {
        for (index, handler) in self.inner.handlers.iter().enumerate() {
            if handler.can_handle(ctx).await {
                debug!(index, handler = handler.name(), "Request handler selected");
                return Some(handler.as_ref());
            }
            trace!(index, handler = handler.name(), "Request handler declined");
        }

        debug!(
            handler_count = self.inner.handlers.len(),
            "No request handler accepted the request"
        );
        None
    }

    async fn recover(
        &self,
        ctx: &mut SlackContext,
        request_handler: Option<&dyn RequestHandler<R>>,
        error: BoxError,
    ) -> HandlerResult<R> {
        let inner = &self.inner;

        if error.is::<HandlerNotFound>() && !inner.options.request_handler_triggers_error_handlers
        {
            trace!("Handler-not-found escalation disabled, returning error");
            return Err(error);
        }

        if inner.error_handlers.is_empty() {
            trace!(error = %error, "No error handlers registered, returning error");
            return Err(error);
        }

        for (index, handler) in inner.error_handlers.iter().enumerate() {
            if handler.can_handle(ctx, &error).await {
                debug!(
                    index,
                    handler = handler.name(),
                    error = %error,
                    "Error handler selected"
                );
                return ErrorNext::new(
                    &inner.error_interceptors,
                    request_handler,
                    handler.as_ref(),
                    &error,
                )
                .run(ctx)
                .await;
            }
        }

        debug!(error = %error, "No error handler accepted the error");
        Err(error)
    }
}

impl<R> fmt::Debug for Pipeline<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("handler_count", &self.inner.handlers.len())
            .field("error_handler_count", &self.inner.error_handlers.len())
            .field("interceptor_count", &self.inner.interceptors.len())
            .field(
                "error_interceptor_count",
                &self.inner.error_interceptors.len(),
            )
            .field("options", &self.inner.options)
            .finish()
    }
}

// ============================================================================
// Tower Service Implementation
// ============================================================================

/// Lets tower middleware (timeouts, concurrency limits) wrap a pipeline.
///
/// ```rust,ignore
/// use tower::ServiceBuilder;
/// use tower::timeout::TimeoutLayer;
///
/// let service = ServiceBuilder::new()
///     .layer(TimeoutLayer::new(Duration::from_secs(3)))
///     .service(pipeline);
/// ```
impl<R: Send + 'static> Service<SlackRequest> for Pipeline<R> {
    type Response = R;
    type Error = BoxError;
    type Future = BoxFuture<'static, HandlerResult<R>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: SlackRequest) -> Self::Future {
        let pipeline = self.clone();
        Box::pin(async move { pipeline.process(request).await })
    }
}

impl<R: Send + 'static> Service<Envelope> for Pipeline<R> {
    type Response = R;
    type Error = BoxError;
    type Future = BoxFuture<'static, HandlerResult<R>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, envelope: Envelope) -> Self::Future {
        let pipeline = self.clone();
        Box::pin(async move { pipeline.process_envelope(envelope).await })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tower::ServiceExt;

    use super::*;
    use crate::model::SlashCommand;

    struct Always(&'static str);

    #[async_trait]
    impl RequestHandler<&'static str> for Always {
        async fn can_handle(&self, _ctx: &mut SlackContext) -> bool {
            true
        }

        async fn handle(&self, _ctx: &mut SlackContext) -> HandlerResult<&'static str> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_options_default() {
        let options = PipelineOptions::default();
        assert!(options.request_handler_triggers_error_handlers);
        assert!(options.name.is_none());

        let parsed: PipelineOptions =
            serde_json::from_str(r#"{"name":"bot"}"#).unwrap();
        assert!(parsed.request_handler_triggers_error_handlers);
        assert_eq!(parsed.name.as_deref(), Some("bot"));
    }

    #[test]
    fn test_builder_is_copy_on_write() {
        let base = Pipeline::<&'static str>::new().handler(Always("a"));
        let extended = base.clone().handler(Always("b"));

        assert_eq!(base.handler_count(), 1);
        assert_eq!(extended.handler_count(), 2);
    }

    #[tokio::test]
    async fn test_tower_service() {
        let pipeline = Pipeline::<&'static str>::new().handler(Always("served"));
        let response = pipeline
            .oneshot(SlackRequest::from(SlashCommand::new("ping")))
            .await
            .unwrap();
        assert_eq!(response, "served");
    }
}
