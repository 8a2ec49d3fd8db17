//! Request handlers keyed on a typed payload.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use slackline_core::{HandlerError, HandlerResult, Payload, RequestHandler, SlackContext};

/// An extra condition on an extracted payload.
pub type PayloadCheck<P> = Arc<dyn Fn(&P) -> bool + Send + Sync>;

/// Handles one payload type.
///
/// Implemented for closures taking the payload by value, so small handlers
/// can be written inline:
///
/// ```rust,ignore
/// on_command("weather").handler(|cmd: SlashCommand| async move {
///     Ok::<_, BoxError>(format!("forecast for {}", cmd.text))
/// })
/// ```
#[async_trait]
pub trait PayloadHandler<P, R>: Send + Sync {
    async fn handle_payload(&self, payload: &P, ctx: &mut SlackContext) -> HandlerResult<R>;
}

#[async_trait]
impl<P, R, F, Fut> PayloadHandler<P, R> for F
where
    P: Clone + Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(P) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult<R>> + Send,
{
    async fn handle_payload(&self, payload: &P, _ctx: &mut SlackContext) -> HandlerResult<R> {
        (self)(payload.clone()).await
    }
}

/// A request handler accepting requests that carry a `P`.
///
/// Built with [`on`](crate::routing::on) and friends.
pub struct On<P, H> {
    check: Option<PayloadCheck<P>>,
    handler: H,
    name: String,
    _payload: PhantomData<fn() -> P>,
}

impl<P: Payload, H> On<P, H> {
    pub(crate) fn new(check: Option<PayloadCheck<P>>, handler: H) -> Self {
        Self {
            check,
            handler,
            name: format!("on<{}>", P::DESCRIPTION),
            _payload: PhantomData,
        }
    }

    /// Overrides the name used in log output.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn accepts(&self, payload: &P) -> bool {
        self.check.as_ref().is_none_or(|check| check(payload))
    }
}

#[async_trait]
impl<P, H, R> RequestHandler<R> for On<P, H>
where
    P: Payload,
    H: PayloadHandler<P, R>,
    R: Send + 'static,
{
    async fn can_handle(&self, ctx: &mut SlackContext) -> bool {
        ctx.payload::<P>().is_some_and(|payload| self.accepts(payload))
    }

    async fn handle(&self, ctx: &mut SlackContext) -> HandlerResult<R> {
        let request = ctx.shared_request();
        let payload = P::extract(&request)
            .ok_or_else(|| HandlerError::unexpected(P::DESCRIPTION, request.kind()))?;
        self.handler.handle_payload(payload, ctx).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<P, H> fmt::Debug for On<P, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("On")
            .field("name", &self.name)
            .field("has_check", &self.check.is_some())
            .finish()
    }
}
