//! Modal tree nodes and the behaviour they delegate to.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{debug, trace};

use slackline_core::model::{
    BlockActionsPayload, ResponseAction, View, ViewSubmissionPayload, WebApiResponse,
};
use slackline_core::{
    ApiResult, HandlerError, HandlerResult, Payload, SlackContext, SlackRequest,
};

use super::client::ViewClient;
use super::route::{MODAL_ROUTE_KEY, ModalId, ModalMode, ModalRoute};

/// A check deciding whether a block action updates a node's view.
pub type UpdateCheck = Arc<dyn Fn(&BlockActionsPayload) -> bool + Send + Sync>;

/// The outcome of handling a modal request.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalResult {
    /// Answer to a view submission. `None` closes the submitted view.
    Submit(Option<ResponseAction>),
    /// Result of the API call that updated the view, if one was made.
    Update(Option<WebApiResponse>),
}

/// Behaviour of one modal view.
///
/// Only [`initial_view`](Modal::initial_view) is required; the default
/// `submit` and `update` do nothing.
#[async_trait]
pub trait Modal: Send + Sync {
    /// The view presented when this modal is opened or pushed.
    fn initial_view(&self) -> View;

    /// Called for a submission of this modal's view.
    async fn submit(
        &self,
        _payload: &ViewSubmissionPayload,
        _ctx: &mut SlackContext,
        _scope: ModalScope<'_>,
    ) -> HandlerResult<Option<ResponseAction>> {
        Ok(None)
    }

    /// Called for a block action accepted by the node's update check.
    async fn update(
        &self,
        _payload: &BlockActionsPayload,
        _ctx: &mut SlackContext,
        _scope: ModalScope<'_>,
    ) -> HandlerResult<Option<WebApiResponse>> {
        Ok(None)
    }
}

/// The node a [`Modal`] callback runs for, and the node above it.
#[derive(Clone, Copy)]
pub struct ModalScope<'a> {
    node: &'a ModalNode,
    parent: Option<&'a ModalNode>,
}

impl<'a> ModalScope<'a> {
    pub fn node(&self) -> &'a ModalNode {
        self.node
    }

    pub fn parent(&self) -> Option<&'a ModalNode> {
        self.parent
    }

    /// Looks up a named child of the current node.
    pub fn child(&self, name: &str) -> Option<&'a ModalNode> {
        self.node.find_child(name)
    }

    /// Presents the current node's view.
    pub async fn present(
        &self,
        client: &dyn ViewClient,
        trigger_id: &str,
    ) -> ApiResult<WebApiResponse> {
        self.node.present(client, trigger_id, self.parent).await
    }

    /// Pushes the named child's view on top of the current one.
    ///
    /// Returns `None` when no child has that name.
    pub async fn present_child(
        &self,
        client: &dyn ViewClient,
        trigger_id: &str,
        name: &str,
    ) -> Option<ApiResult<WebApiResponse>> {
        let child = self.node.find_child(name)?;
        Some(child.present(client, trigger_id, Some(self.node)).await)
    }
}

impl fmt::Debug for ModalScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalScope")
            .field("node", &self.node.id)
            .field("parent", &self.parent.map(|p| &p.id))
            .finish()
    }
}

/// One modal in a tree of modals.
///
/// A node accepts a request when it is a submission of its own view, when its
/// update check accepts a block action, or when one of its children accepts.
/// Node ids are structural (root callback id plus child index path) and are
/// reassigned whenever a subtree is attached, so a finished tree is
/// immutable and deterministic.
///
/// ```rust,ignore
/// let root = ModalNode::new("signup", SignupForm)
///     .update_on_actions(["pick_team"])
///     .child("confirm", ModalNode::new("signup_confirm", Confirm));
/// ```
pub struct ModalNode {
    id: ModalId,
    name: String,
    callback_id: String,
    update_check: Option<UpdateCheck>,
    behaviour: Arc<dyn Modal>,
    children: Vec<ModalNode>,
}

impl ModalNode {
    /// Creates a node whose view submits with `callback_id`.
    pub fn new(callback_id: impl Into<String>, behaviour: impl Modal + 'static) -> Self {
        Self::with_behaviour(callback_id, Arc::new(behaviour))
    }

    /// Creates a node around a shared behaviour.
    pub fn with_behaviour(callback_id: impl Into<String>, behaviour: Arc<dyn Modal>) -> Self {
        let callback_id = callback_id.into();
        Self {
            id: ModalId::root(&callback_id),
            name: callback_id.clone(),
            callback_id,
            update_check: None,
            behaviour,
            children: Vec::new(),
        }
    }

    /// Updates the view for block actions containing any of `action_ids`.
    pub fn update_on_actions<I, S>(self, action_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let action_ids: Vec<String> = action_ids.into_iter().map(Into::into).collect();
        self.update_when(move |payload| payload.has_any_action(&action_ids))
    }

    /// Updates the view for block actions accepted by `check`.
    pub fn update_when<F>(mut self, check: F) -> Self
    where
        F: Fn(&BlockActionsPayload) -> bool + Send + Sync + 'static,
    {
        self.update_check = Some(Arc::new(check));
        self
    }

    /// Attaches a named child.
    pub fn child(mut self, name: impl Into<String>, mut node: ModalNode) -> Self {
        node.name = name.into();
        node.reassign(self.id.child(self.children.len()));
        self.children.push(node);
        self
    }

    fn reassign(&mut self, id: ModalId) {
        for (index, child) in self.children.iter_mut().enumerate() {
            child.reassign(id.child(index));
        }
        self.id = id;
    }

    pub fn id(&self) -> &ModalId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn callback_id(&self) -> &str {
        &self.callback_id
    }

    /// Looks up a direct child by name.
    pub fn find_child(&self, name: &str) -> Option<&ModalNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children(&self) -> impl Iterator<Item = &ModalNode> {
        self.children.iter()
    }

    /// Finds the node accepting `request` in this subtree.
    ///
    /// The node itself is tried first (submission, then update), then its
    /// children in order. Does not touch the context.
    pub fn select(&self, request: &SlackRequest) -> Option<ModalRoute> {
        if let Some(submission) = ViewSubmissionPayload::extract(request)
            && submission.view.callback_id.as_deref() == Some(self.callback_id.as_str())
        {
            return Some(ModalRoute::new(self.id.clone(), ModalMode::Submit));
        }

        if let (Some(check), Some(actions)) =
            (&self.update_check, BlockActionsPayload::extract(request))
            && check(actions)
        {
            return Some(ModalRoute::new(self.id.clone(), ModalMode::Update));
        }

        self.children
            .iter()
            .find_map(|child| child.select(request))
            .map(|route| route.prepend(self.id.clone()))
    }

    /// Selects a node and records the selection in the context.
    ///
    /// The mode is stored under the selected node's key and the route under
    /// [`MODAL_ROUTE_KEY`].
    pub fn can_handle(&self, ctx: &mut SlackContext) -> bool {
        let Some(route) = self.select(ctx.request()) else {
            return false;
        };

        trace!(node = %route.selected(), mode = ?route.mode(), "Modal selected");
        let items = ctx.items_mut();
        items.insert(route.selected().key(), route.mode());
        items.insert(MODAL_ROUTE_KEY, route);
        true
    }

    /// Handles a request previously accepted by [`can_handle`](Self::can_handle).
    ///
    /// When this node was selected its behaviour runs with `parent`;
    /// otherwise the request is passed down the recorded route with this node
    /// as the parent.
    pub fn handle<'a>(
        &'a self,
        ctx: &'a mut SlackContext,
        parent: Option<&'a ModalNode>,
    ) -> BoxFuture<'a, HandlerResult<ModalResult>> {
        Box::pin(async move {
            let mode = ctx.items().get::<ModalMode>(&self.id.key()).copied();
            if let Some(mode) = mode {
                return self.run(mode, ctx, parent).await;
            }

            let child = ctx
                .items()
                .get::<ModalRoute>(MODAL_ROUTE_KEY)
                .and_then(|route| route.next_after(&self.id))
                .and_then(|next| self.children.iter().find(|c| &c.id == next))
                .ok_or_else(|| HandlerError::not_selected(self.id.key()))?;

            child.handle(ctx, Some(self)).await
        })
    }

    async fn run(
        &self,
        mode: ModalMode,
        ctx: &mut SlackContext,
        parent: Option<&ModalNode>,
    ) -> HandlerResult<ModalResult> {
        let scope = ModalScope { node: self, parent };
        let request = ctx.shared_request();
        debug!(node = %self.id, ?mode, "Running modal");

        match mode {
            ModalMode::Submit => {
                let payload = ViewSubmissionPayload::extract(&request).ok_or_else(|| {
                    HandlerError::unexpected(ViewSubmissionPayload::DESCRIPTION, request.kind())
                })?;
                let action = self.behaviour.submit(payload, ctx, scope).await?;
                Ok(ModalResult::Submit(action))
            }
            ModalMode::Update => {
                let payload = BlockActionsPayload::extract(&request).ok_or_else(|| {
                    HandlerError::unexpected(BlockActionsPayload::DESCRIPTION, request.kind())
                })?;
                let response = self.behaviour.update(payload, ctx, scope).await?;
                Ok(ModalResult::Update(response))
            }
        }
    }

    /// This node's initial view, with its callback id filled in.
    pub fn view(&self) -> View {
        let mut view = self.behaviour.initial_view();
        view.callback_id = Some(self.callback_id.clone());
        view
    }

    /// Opens this node's view, or pushes it when a parent is given.
    pub async fn present(
        &self,
        client: &dyn ViewClient,
        trigger_id: &str,
        parent: Option<&ModalNode>,
    ) -> ApiResult<WebApiResponse> {
        let view = self.view();
        let response = match parent {
            None => client.open_view(trigger_id, view).await?,
            Some(parent) => {
                debug!(node = %self.id, parent = %parent.id, "Pushing modal");
                client.push_view(trigger_id, view).await?
            }
        };
        response.into_result()
    }
}

impl fmt::Debug for ModalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("callback_id", &self.callback_id)
            .field("updates", &self.update_check.is_some())
            .field("children", &self.children)
            .finish()
    }
}
