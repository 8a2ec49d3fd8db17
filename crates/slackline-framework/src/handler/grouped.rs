//! A request handler guarding a group of child handlers behind one check.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tracing::trace;

use slackline_core::{HandlerError, HandlerResult, RequestHandler, SlackContext};

/// A synchronous check on the whole request.
pub type GroupCheck = Arc<dyn Fn(&SlackContext) -> bool + Send + Sync>;

static NEXT_GROUP_ID: AtomicU64 = AtomicU64::new(0);

/// Index of the child a [`Grouped`] handler selected, stored in the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GroupSelection(usize);

/// Runs a group check once, then selects the first accepting child.
///
/// Children are only queried when the group check passes. The selected
/// child's index is recorded under the group's own key so `handle` invokes
/// exactly that child.
///
/// ```rust,ignore
/// let admin = Grouped::new(|ctx| is_admin(ctx))
///     .handler(on_command("ban").handler(ban))
///     .handler(on_command("kick").handler(kick));
/// ```
pub struct Grouped<R> {
    key: String,
    check: GroupCheck,
    children: Vec<Arc<dyn RequestHandler<R>>>,
}

impl<R: Send + 'static> Grouped<R> {
    /// Creates an empty group guarded by `check`.
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&SlackContext) -> bool + Send + Sync + 'static,
    {
        let id = NEXT_GROUP_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            key: format!("group:{id}"),
            check: Arc::new(check),
            children: Vec::new(),
        }
    }

    /// Appends a child handler.
    pub fn handler<H>(mut self, handler: H) -> Self
    where
        H: RequestHandler<R> + 'static,
    {
        self.children.push(Arc::new(handler));
        self
    }

    /// Appends a shared child handler.
    pub fn handler_arc(mut self, handler: Arc<dyn RequestHandler<R>>) -> Self {
        self.children.push(handler);
        self
    }

    /// The scratch-map key this group records its selection under.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[async_trait]
impl<R: Send + 'static> RequestHandler<R> for Grouped<R> {
    async fn can_handle(&self, ctx: &mut SlackContext) -> bool {
        if !(self.check)(&*ctx) {
            trace!(group = %self.key, "Group check failed");
            return false;
        }

        for (index, child) in self.children.iter().enumerate() {
            if child.can_handle(ctx).await {
                trace!(group = %self.key, index, child = child.name(), "Group child selected");
                ctx.items_mut()
                    .insert(self.key.clone(), GroupSelection(index));
                return true;
            }
        }

        false
    }

    async fn handle(&self, ctx: &mut SlackContext) -> HandlerResult<R> {
        let child = ctx
            .items()
            .get::<GroupSelection>(&self.key)
            .and_then(|GroupSelection(index)| self.children.get(*index))
            .ok_or_else(|| HandlerError::not_selected(self.key.as_str()))?;
        child.handle(ctx).await
    }

    fn name(&self) -> &str {
        &self.key
    }
}

impl<R> fmt::Debug for Grouped<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grouped")
            .field("key", &self.key)
            .field("children", &self.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use slackline_core::SlackRequest;
    use slackline_core::model::SlashCommand;
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    struct Child {
        accepts: bool,
        label: &'static str,
        queried: Arc<AtomicUsize>,
    }

    impl Child {
        fn new(accepts: bool, label: &'static str) -> Self {
            Self {
                accepts,
                label,
                queried: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl RequestHandler<&'static str> for Child {
        async fn can_handle(&self, _ctx: &mut SlackContext) -> bool {
            self.queried.fetch_add(1, Ordering::SeqCst);
            self.accepts
        }

        async fn handle(&self, _ctx: &mut SlackContext) -> HandlerResult<&'static str> {
            Ok(self.label)
        }
    }

    #[tokio::test]
    async fn test_selects_first_accepting_child() {
        let group = Grouped::<&'static str>::new(|_| true)
            .handler(Child::new(false, "first"))
            .handler(Child::new(true, "second"))
            .handler(Child::new(true, "third"));

        let mut ctx = SlackContext::new(SlackRequest::Unknown);
        assert!(group.can_handle(&mut ctx).await);
        assert_eq!(assert_ok!(group.handle(&mut ctx).await), "second");
    }

    #[tokio::test]
    async fn test_failed_group_check_skips_children() {
        let child = Child::new(true, "child");
        let queried = child.queried.clone();
        let group = Grouped::<&'static str>::new(|ctx| ctx.payload::<SlashCommand>().is_some())
            .handler(child);

        let mut ctx = SlackContext::new(SlackRequest::Unknown);
        assert!(!group.can_handle(&mut ctx).await);
        assert_eq!(queried.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handle_without_selection_fails() {
        let group = Grouped::<&'static str>::new(|_| true).handler(Child::new(true, "child"));
        let mut ctx = SlackContext::new(SlackRequest::Unknown);

        let err = assert_err!(group.handle(&mut ctx).await);
        assert!(matches!(
            err.downcast_ref::<HandlerError>(),
            Some(HandlerError::NotSelected { .. })
        ));
    }

    #[test]
    fn test_groups_get_distinct_keys() {
        let a = Grouped::<()>::new(|_| true);
        let b = Grouped::<()>::new(|_| true);
        assert_ne!(a.key(), b.key());
    }
}
