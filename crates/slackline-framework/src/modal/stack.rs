//! A request handler over a modal tree.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use slackline_core::{HandlerResult, RequestHandler, SlackContext};

use super::node::{ModalNode, ModalResult};

/// Converts a [`ModalResult`] into the pipeline's result type.
pub type ModalConverter<R> = Arc<dyn Fn(ModalResult) -> HandlerResult<R> + Send + Sync>;

/// Registers a modal tree with a pipeline.
///
/// Selection and dispatch are delegated to the root [`ModalNode`]; the
/// converter maps the modal outcome to whatever the pipeline returns.
pub struct ModalStack<R> {
    name: String,
    root: ModalNode,
    convert: ModalConverter<R>,
}

impl<R> ModalStack<R> {
    pub fn new<F>(root: ModalNode, convert: F) -> Self
    where
        F: Fn(ModalResult) -> HandlerResult<R> + Send + Sync + 'static,
    {
        Self {
            name: format!("modal_stack:{}", root.id()),
            root,
            convert: Arc::new(convert),
        }
    }

    pub fn root(&self) -> &ModalNode {
        &self.root
    }
}

impl ModalStack<ModalResult> {
    /// A stack returning the [`ModalResult`] unchanged.
    pub fn passthrough(root: ModalNode) -> Self {
        Self::new(root, Ok)
    }
}

#[async_trait]
impl<R: Send + 'static> RequestHandler<R> for ModalStack<R> {
    async fn can_handle(&self, ctx: &mut SlackContext) -> bool {
        self.root.can_handle(ctx)
    }

    async fn handle(&self, ctx: &mut SlackContext) -> HandlerResult<R> {
        let result = self.root.handle(ctx, None).await?;
        (self.convert)(result)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<R> fmt::Debug for ModalStack<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalStack")
            .field("name", &self.name)
            .field("root", &self.root)
            .finish()
    }
}
