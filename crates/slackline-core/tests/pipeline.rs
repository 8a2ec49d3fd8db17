use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_test::{assert_err, assert_ok};

use slackline_core::model::{BlockActionsPayload, Envelope, EnvelopeType, SlackRequest};
use slackline_core::{
    BoxError, ENVELOPE_KEY, ErrorHandler, ErrorInterceptor, ErrorNext, HandlerNotFound,
    HandlerResult, Next, Pipeline, PipelineOptions, PreconditionError, RequestHandler,
    RequestInterceptor, SlackContext,
};

type Log = Arc<Mutex<String>>;

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Debug, thiserror::Error)]
#[error("handler failed")]
struct HandlerFailed;

#[derive(Debug, thiserror::Error)]
#[error("recovery failed")]
struct RecoveryFailed;

/// A request handler with a fixed answer that counts how often it is asked.
#[derive(Clone)]
struct Fixed {
    accepts: bool,
    fails: bool,
    response: &'static str,
    queried: Arc<AtomicUsize>,
    log: Option<Log>,
}

impl Fixed {
    fn accepting(response: &'static str) -> Self {
        Self {
            accepts: true,
            fails: false,
            response,
            queried: Arc::default(),
            log: None,
        }
    }

    fn declining() -> Self {
        Self {
            accepts: false,
            ..Self::accepting("declined")
        }
    }

    fn failing() -> Self {
        Self {
            fails: true,
            ..Self::accepting("failed")
        }
    }

    fn logging(mut self, log: &Log) -> Self {
        self.log = Some(log.clone());
        self
    }

    fn queried(&self) -> usize {
        self.queried.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RequestHandler<&'static str> for Fixed {
    async fn can_handle(&self, _ctx: &mut SlackContext) -> bool {
        self.queried.fetch_add(1, Ordering::SeqCst);
        self.accepts
    }

    async fn handle(&self, _ctx: &mut SlackContext) -> HandlerResult<&'static str> {
        if let Some(log) = &self.log {
            log.lock().push('H');
        }
        if self.fails {
            return Err(HandlerFailed.into());
        }
        Ok(self.response)
    }
}

/// An error handler that accepts errors matching a predicate.
struct Catch {
    accepts: fn(&BoxError) -> bool,
    response: &'static str,
}

impl Catch {
    fn all(response: &'static str) -> Self {
        Self {
            accepts: |_| true,
            response,
        }
    }

    fn only(accepts: fn(&BoxError) -> bool, response: &'static str) -> Self {
        Self { accepts, response }
    }
}

#[async_trait]
impl ErrorHandler<&'static str> for Catch {
    async fn can_handle(&self, _ctx: &mut SlackContext, error: &BoxError) -> bool {
        (self.accepts)(error)
    }

    async fn handle(
        &self,
        _ctx: &mut SlackContext,
        _error: &BoxError,
    ) -> HandlerResult<&'static str> {
        Ok(self.response)
    }
}

/// Appends `before` and `after` around the rest of the chain.
struct Mark {
    before: char,
    after: char,
    log: Log,
}

#[async_trait]
impl RequestInterceptor<&'static str> for Mark {
    async fn intercept(
        &self,
        ctx: &mut SlackContext,
        _handler: &dyn RequestHandler<&'static str>,
        next: Next<'_, &'static str>,
    ) -> HandlerResult<&'static str> {
        self.log.lock().push(self.before);
        let result = next.run(ctx).await;
        self.log.lock().push(self.after);
        result
    }
}

/// Records whether a request handler was carried into the error chain.
struct Observe {
    saw_request_handler: Arc<Mutex<Option<bool>>>,
}

#[async_trait]
impl ErrorInterceptor<&'static str> for Observe {
    async fn intercept(
        &self,
        ctx: &mut SlackContext,
        request_handler: Option<&dyn RequestHandler<&'static str>>,
        _error_handler: &dyn ErrorHandler<&'static str>,
        _error: &BoxError,
        next: ErrorNext<'_, &'static str>,
    ) -> HandlerResult<&'static str> {
        *self.saw_request_handler.lock() = Some(request_handler.is_some());
        next.run(ctx).await
    }
}

/// Appends markers around the rest of the error chain, or answers itself
/// without calling `next` when `short_circuit` is set.
struct ErrorMark {
    before: char,
    after: char,
    short_circuit: Option<&'static str>,
    log: Log,
}

impl ErrorMark {
    fn new(before: char, after: char, log: &Log) -> Self {
        Self {
            before,
            after,
            short_circuit: None,
            log: log.clone(),
        }
    }
}

#[async_trait]
impl ErrorInterceptor<&'static str> for ErrorMark {
    async fn intercept(
        &self,
        ctx: &mut SlackContext,
        _request_handler: Option<&dyn RequestHandler<&'static str>>,
        _error_handler: &dyn ErrorHandler<&'static str>,
        _error: &BoxError,
        next: ErrorNext<'_, &'static str>,
    ) -> HandlerResult<&'static str> {
        self.log.lock().push(self.before);
        if let Some(response) = self.short_circuit {
            return Ok(response);
        }
        let result = next.run(ctx).await;
        self.log.lock().push(self.after);
        result
    }
}

/// An error handler that logs `E` and fails itself when `fails` is set.
struct Recover {
    fails: bool,
    log: Log,
}

#[async_trait]
impl ErrorHandler<&'static str> for Recover {
    async fn can_handle(&self, _ctx: &mut SlackContext, _error: &BoxError) -> bool {
        true
    }

    async fn handle(
        &self,
        _ctx: &mut SlackContext,
        _error: &BoxError,
    ) -> HandlerResult<&'static str> {
        self.log.lock().push('E');
        if self.fails {
            return Err(RecoveryFailed.into());
        }
        Ok("recovered")
    }
}

/// An error handler accepting everything that counts how often it is asked.
#[derive(Clone, Default)]
struct CountingCatch {
    queried: Arc<AtomicUsize>,
}

#[async_trait]
impl ErrorHandler<&'static str> for CountingCatch {
    async fn can_handle(&self, _ctx: &mut SlackContext, _error: &BoxError) -> bool {
        self.queried.fetch_add(1, Ordering::SeqCst);
        true
    }

    async fn handle(
        &self,
        _ctx: &mut SlackContext,
        _error: &BoxError,
    ) -> HandlerResult<&'static str> {
        Ok("second chance")
    }
}

fn unknown() -> SlackRequest {
    SlackRequest::Unknown
}

fn new_pipeline() -> Pipeline<&'static str> {
    Pipeline::new()
}

// ============================================================================
// Selection
// ============================================================================

#[tokio::test]
async fn empty_pipeline_reports_handler_not_found() {
    let pipeline = new_pipeline();
    let err = assert_err!(pipeline.process(unknown()).await);
    assert!(err.is::<HandlerNotFound>());
}

#[tokio::test]
async fn first_accepting_handler_wins_and_later_ones_are_not_queried() {
    let first = Fixed::declining();
    let second = Fixed::accepting("second");
    let third = Fixed::accepting("third");

    let pipeline = new_pipeline()
        .handler(first.clone())
        .handler(second.clone())
        .handler(third.clone());

    assert_eq!(assert_ok!(pipeline.process(unknown()).await), "second");
    assert_eq!(first.queried(), 1);
    assert_eq!(second.queried(), 1);
    assert_eq!(third.queried(), 0);
}

#[tokio::test]
async fn declining_handlers_report_handler_not_found() {
    let pipeline = new_pipeline().handler(Fixed::declining());
    let err = assert_err!(pipeline.process(unknown()).await);
    assert!(err.is::<HandlerNotFound>());
}

// ============================================================================
// Preconditions
// ============================================================================

#[tokio::test]
async fn missing_request_fails_before_any_handler_is_queried() {
    let handler = Fixed::accepting("never");
    let pipeline = new_pipeline()
        .handler(handler.clone())
        .error_handler(Catch::all("never"));

    let err = assert_err!(pipeline.process(None::<SlackRequest>).await);
    assert!(matches!(
        err.downcast_ref::<PreconditionError>(),
        Some(PreconditionError::MissingRequest)
    ));
    assert_eq!(handler.queried(), 0);
}

#[tokio::test]
async fn missing_envelope_fails_before_any_handler_is_queried() {
    let handler = Fixed::accepting("never");
    let pipeline = new_pipeline()
        .handler(handler.clone())
        .error_handler(Catch::all("never"));

    let err = assert_err!(pipeline.process_envelope(None::<Envelope>).await);
    assert!(matches!(
        err.downcast_ref::<PreconditionError>(),
        Some(PreconditionError::MissingEnvelope)
    ));
    assert_eq!(handler.queried(), 0);
}

// ============================================================================
// Interceptors
// ============================================================================

#[tokio::test]
async fn interceptors_wrap_the_handler_in_registration_order() {
    let log = Log::default();
    let pipeline = new_pipeline()
        .handler(Fixed::accepting("ok").logging(&log))
        .interceptor(Mark {
            before: '1',
            after: '5',
            log: log.clone(),
        })
        .interceptor(Mark {
            before: '2',
            after: '4',
            log: log.clone(),
        });

    assert_ok!(pipeline.process(unknown()).await);
    assert_eq!(*log.lock(), "12H45");
}

#[tokio::test]
async fn registration_order_decides_nesting() {
    let log = Log::default();
    let pipeline = new_pipeline()
        .handler(Fixed::accepting("ok").logging(&log))
        .interceptor(Mark {
            before: '2',
            after: '4',
            log: log.clone(),
        })
        .interceptor(Mark {
            before: '1',
            after: '5',
            log: log.clone(),
        });

    assert_ok!(pipeline.process(unknown()).await);
    assert_eq!(*log.lock(), "21H54");
}

// ============================================================================
// Error handling
// ============================================================================

#[tokio::test]
async fn handler_not_found_falls_back_to_error_handler() {
    let pipeline = new_pipeline()
        .handler(Fixed::declining())
        .error_handler(Catch::all("recovered"));

    assert_eq!(assert_ok!(pipeline.process(unknown()).await), "recovered");
}

#[tokio::test]
async fn disabled_escalation_returns_handler_not_found() {
    let pipeline = new_pipeline()
        .error_handler(Catch::all("recovered"))
        .with_options(PipelineOptions {
            request_handler_triggers_error_handlers: false,
            name: Some("strict".into()),
        });

    let err = assert_err!(pipeline.process(unknown()).await);
    assert!(err.is::<HandlerNotFound>());
}

#[tokio::test]
async fn disabled_escalation_still_recovers_handler_failures() {
    let pipeline = new_pipeline()
        .handler(Fixed::failing())
        .error_handler(Catch::all("recovered"))
        .request_handler_triggers_error_handlers(false);

    assert_eq!(assert_ok!(pipeline.process(unknown()).await), "recovered");
}

#[tokio::test]
async fn handler_failure_without_error_handlers_is_returned_unchanged() {
    let pipeline = new_pipeline().handler(Fixed::failing());
    let err = assert_err!(pipeline.process(unknown()).await);
    assert!(err.is::<HandlerFailed>());
}

#[tokio::test]
async fn unaccepted_error_is_returned_unchanged() {
    let pipeline = new_pipeline()
        .handler(Fixed::failing())
        .error_handler(Catch::only(|e| e.is::<HandlerNotFound>(), "never"));

    let err = assert_err!(pipeline.process(unknown()).await);
    assert!(err.is::<HandlerFailed>());
}

#[tokio::test]
async fn specific_error_handler_picks_before_catch_all() {
    let pipeline = new_pipeline()
        .handler(Fixed::failing())
        .error_handler(Catch::only(|e| e.is::<HandlerFailed>(), "specific"))
        .error_handler(Catch::all("generic"));

    assert_eq!(assert_ok!(pipeline.process(unknown()).await), "specific");
}

#[tokio::test]
async fn error_chain_carries_the_selected_request_handler() {
    let seen: Arc<Mutex<Option<bool>>> = Arc::default();
    let pipeline = new_pipeline()
        .handler(Fixed::failing())
        .error_handler(Catch::all("recovered"))
        .error_interceptor(Observe {
            saw_request_handler: seen.clone(),
        });
    assert_ok!(pipeline.process(unknown()).await);
    assert_eq!(*seen.lock(), Some(true));

    let not_found = new_pipeline()
        .error_handler(Catch::all("recovered"))
        .error_interceptor(Observe {
            saw_request_handler: seen.clone(),
        });
    assert_ok!(not_found.process(unknown()).await);
    assert_eq!(*seen.lock(), Some(false));
}

#[tokio::test]
async fn error_interceptors_wrap_the_error_handler_in_registration_order() {
    let log = Log::default();
    let pipeline = new_pipeline()
        .handler(Fixed::failing())
        .error_handler(Recover {
            fails: false,
            log: log.clone(),
        })
        .error_interceptor(ErrorMark::new('1', '5', &log))
        .error_interceptor(ErrorMark::new('2', '4', &log));

    assert_eq!(assert_ok!(pipeline.process(unknown()).await), "recovered");
    assert_eq!(*log.lock(), "12E45");
}

#[tokio::test]
async fn error_interceptor_can_answer_without_the_error_handler() {
    let log = Log::default();
    let pipeline = new_pipeline()
        .handler(Fixed::failing())
        .error_handler(Recover {
            fails: false,
            log: log.clone(),
        })
        .error_interceptor(ErrorMark::new('1', '5', &log))
        .error_interceptor(ErrorMark {
            short_circuit: Some("intercepted"),
            ..ErrorMark::new('2', '4', &log)
        })
        .error_interceptor(ErrorMark::new('3', '3', &log));

    assert_eq!(assert_ok!(pipeline.process(unknown()).await), "intercepted");
    assert_eq!(*log.lock(), "125");
}

#[tokio::test]
async fn failing_error_handler_error_reaches_the_caller() {
    let log = Log::default();
    let fallback = CountingCatch::default();
    let pipeline = new_pipeline()
        .handler(Fixed::failing())
        .error_handler(Recover {
            fails: true,
            log: log.clone(),
        })
        .error_handler(fallback.clone());

    let err = assert_err!(pipeline.process(unknown()).await);
    assert!(err.is::<RecoveryFailed>());
    assert_eq!(fallback.queried.load(Ordering::SeqCst), 0);
    assert_eq!(*log.lock(), "E");
}

#[tokio::test]
async fn failing_error_interceptor_error_reaches_the_caller() {
    struct Explode;

    #[async_trait]
    impl ErrorInterceptor<&'static str> for Explode {
        async fn intercept(
            &self,
            _ctx: &mut SlackContext,
            _request_handler: Option<&dyn RequestHandler<&'static str>>,
            _error_handler: &dyn ErrorHandler<&'static str>,
            _error: &BoxError,
            _next: ErrorNext<'_, &'static str>,
        ) -> HandlerResult<&'static str> {
            Err(RecoveryFailed.into())
        }
    }

    let fallback = CountingCatch::default();
    let pipeline = new_pipeline()
        .handler(Fixed::failing())
        .error_handler(fallback.clone())
        .error_interceptor(Explode);

    let err = assert_err!(pipeline.process(unknown()).await);
    assert!(err.is::<RecoveryFailed>());
    assert_eq!(fallback.queried.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Envelopes and tags
// ============================================================================

struct EnvelopeReader;

#[async_trait]
impl RequestHandler<&'static str> for EnvelopeReader {
    async fn can_handle(&self, ctx: &mut SlackContext) -> bool {
        ctx.items().contains_key(ENVELOPE_KEY)
    }

    async fn handle(&self, ctx: &mut SlackContext) -> HandlerResult<&'static str> {
        let envelope = ctx.envelope().ok_or("envelope missing")?;
        Ok(match envelope.envelope_id.as_deref() {
            Some("e-1") => "envelope seen",
            _ => "wrong envelope",
        })
    }
}

#[tokio::test]
async fn envelope_is_available_as_an_item() {
    let envelope = Envelope::new(
        EnvelopeType::Interactive,
        serde_json::to_value(BlockActionsPayload::default()).unwrap(),
    )
    .with_id("e-1");

    let pipeline = new_pipeline().handler(EnvelopeReader);
    assert_eq!(
        assert_ok!(pipeline.process_envelope(envelope).await),
        "envelope seen"
    );
}

struct TagEcho;

#[async_trait]
impl RequestHandler<String> for TagEcho {
    async fn can_handle(&self, _ctx: &mut SlackContext) -> bool {
        true
    }

    async fn handle(&self, ctx: &mut SlackContext) -> HandlerResult<String> {
        Ok(ctx
            .tag_as::<&'static str>()
            .map(|t| t.to_string())
            .unwrap_or_default())
    }
}

#[tokio::test]
async fn tag_reaches_handlers() {
    let pipeline = Pipeline::<String>::new().handler(TagEcho);
    let response = assert_ok!(
        pipeline
            .process_with_tag(unknown(), Some(Arc::new("caller-state")))
            .await
    );
    assert_eq!(response, "caller-state");
}
