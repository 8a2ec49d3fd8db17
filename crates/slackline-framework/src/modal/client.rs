use async_trait::async_trait;

use slackline_core::ApiResult;
use slackline_core::model::{View, WebApiResponse};

/// The view calls a modal tree needs from a Web API client.
#[async_trait]
pub trait ViewClient: Send + Sync {
    /// `views.open`: opens `view` as a new modal.
    async fn open_view(&self, trigger_id: &str, view: View) -> ApiResult<WebApiResponse>;

    /// `views.push`: pushes `view` on top of the current modal stack.
    async fn push_view(&self, trigger_id: &str, view: View) -> ApiResult<WebApiResponse>;
}
