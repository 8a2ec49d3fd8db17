//! Built-in interceptors.

use std::time::Instant;

use async_trait::async_trait;
use tracing::{Instrument, Level, debug, error, span, warn};

use slackline_core::{
    BoxError, ErrorHandler, ErrorInterceptor, ErrorNext, HandlerResult, Next, RequestHandler,
    RequestInterceptor, SlackContext,
};

/// Runs the rest of the request chain inside a `handle` span and logs the
/// elapsed time and outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingInterceptor;

#[async_trait]
impl<R: Send + 'static> RequestInterceptor<R> for TracingInterceptor {
    async fn intercept(
        &self,
        ctx: &mut SlackContext,
        handler: &dyn RequestHandler<R>,
        next: Next<'_, R>,
    ) -> HandlerResult<R> {
        let span = span!(
            Level::DEBUG,
            "handle",
            handler = handler.name(),
            kind = %ctx.kind()
        );

        let start = Instant::now();
        let result = next.run(ctx).instrument(span).await;
        let elapsed = start.elapsed();

        match &result {
            Ok(_) => debug!(handler = handler.name(), ?elapsed, "Request handled"),
            Err(e) => warn!(handler = handler.name(), ?elapsed, error = %e, "Request handler failed"),
        }
        result
    }
}

/// Logs every error that reaches an error handler, with the handlers
/// involved.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorLoggingInterceptor;

#[async_trait]
impl<R: Send + 'static> ErrorInterceptor<R> for ErrorLoggingInterceptor {
    async fn intercept(
        &self,
        ctx: &mut SlackContext,
        request_handler: Option<&dyn RequestHandler<R>>,
        error_handler: &dyn ErrorHandler<R>,
        error: &BoxError,
        next: ErrorNext<'_, R>,
    ) -> HandlerResult<R> {
        error!(
            request = %ctx.request().describe(),
            request_handler = request_handler.map_or("<none>", |h| h.name()),
            error_handler = error_handler.name(),
            error = %error,
            "Handling error"
        );
        next.run(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use slackline_core::{HandlerNotFound, Pipeline, SlackRequest};
    use tokio_test::assert_ok;

    use super::*;
    use crate::routing::{catch_all, catch_all_errors};

    #[tokio::test]
    async fn test_tracing_interceptor_is_transparent() {
        let pipeline = Pipeline::<&'static str>::new()
            .interceptor(TracingInterceptor)
            .handler(catch_all(|_: SlackRequest| async { Ok::<_, BoxError>("done") }));

        assert_eq!(assert_ok!(pipeline.process(SlackRequest::Unknown).await), "done");
    }

    struct Capture(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl ErrorInterceptor<String> for Capture {
        async fn intercept(
            &self,
            ctx: &mut SlackContext,
            _request_handler: Option<&dyn RequestHandler<String>>,
            _error_handler: &dyn ErrorHandler<String>,
            error: &BoxError,
            next: ErrorNext<'_, String>,
        ) -> HandlerResult<String> {
            self.0.lock().push(error.to_string());
            next.run(ctx).await
        }
    }

    #[tokio::test]
    async fn test_error_logging_passes_error_through() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::<String>::new()
            .error_interceptor(ErrorLoggingInterceptor)
            .error_interceptor(Capture(seen.clone()))
            .error_handler(catch_all_errors(|e: &BoxError| {
                let handled = e.is::<HandlerNotFound>();
                async move { Ok::<_, BoxError>(format!("recovered: {handled}")) }
            }));

        let result = assert_ok!(pipeline.process(SlackRequest::Unknown).await);
        assert_eq!(result, "recovered: true");
        assert_eq!(*seen.lock(), ["no matching request handler found"]);
    }
}
