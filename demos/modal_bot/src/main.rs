//! Modal Bot Example
//!
//! A feedback bot built from a slash command and a two-step modal tree:
//!
//! ```text
//! /feedback ──opens──▶ feedback (form)
//!                      └── thanks (pushed after a valid submission)
//! ```
//!
//! Socket-mode envelopes are read from stdin, one JSON object per line, and
//! each reply is printed as JSON. Web API calls are only logged.
//!
//! # Usage
//!
//! ```bash
//! echo '{"type":"slash_commands","payload":{"command":"/feedback","trigger_id":"T1"}}' \
//!     | cargo run --package modal-bot
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use serde::Serialize;
use serde_json::{Value, json};
use slackline::core::{ApiResult, HandlerNotFound};
use slackline::prelude::*;
use slackline::runtime::config::ConfigLoader;
use slackline::runtime::validate_config;
use tokio::io::BufReader;
use tracing::info;

#[derive(Debug, Parser)]
#[command(about = "Dispatch socket-mode envelopes from stdin through a feedback modal bot")]
struct Args {
    /// Configuration file (defaults to searching for slackline.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Configuration profile
    #[arg(short, long)]
    profile: Option<String>,

    /// Override the dispatch timeout
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Override the log level
    #[arg(long)]
    log_level: Option<String>,
}

/// What the bot answers with.
#[derive(Debug, Serialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
enum Reply {
    /// Acknowledge without content.
    Ack,
    /// A message for the user.
    Text { text: String },
    /// The answer to a view submission.
    Response { action: Option<ResponseAction> },
}

// ============================================================================
// Web API (dry run)
// ============================================================================

/// Logs view calls instead of sending them.
struct DryRunClient;

impl DryRunClient {
    fn respond(method: &str, trigger_id: &str, view: View) -> ApiResult<WebApiResponse> {
        info!(method, trigger_id, callback_id = ?view.callback_id, "Web API call (dry run)");
        let mut response = WebApiResponse::success();
        response.extra.insert("view".to_string(), serde_json::to_value(view)?);
        Ok(response)
    }
}

#[async_trait]
impl ViewClient for DryRunClient {
    async fn open_view(&self, trigger_id: &str, view: View) -> ApiResult<WebApiResponse> {
        Self::respond("views.open", trigger_id, view)
    }

    async fn push_view(&self, trigger_id: &str, view: View) -> ApiResult<WebApiResponse> {
        Self::respond("views.push", trigger_id, view)
    }
}

// ============================================================================
// Modals
// ============================================================================

const COMMENT_BLOCK: &str = "comment";

struct FeedbackForm;

#[async_trait]
impl Modal for FeedbackForm {
    fn initial_view(&self) -> View {
        View::modal("feedback")
            .with_title("Feedback")
            .with_block(json!({
                "type": "input",
                "block_id": COMMENT_BLOCK,
                "label": { "type": "plain_text", "text": "What should we improve?" },
                "element": { "type": "plain_text_input", "action_id": "comment_input" }
            }))
            .with_block(json!({
                "type": "actions",
                "elements": [{ "type": "button", "action_id": "clear_comment",
                               "text": { "type": "plain_text", "text": "Clear" } }]
            }))
    }

    async fn submit(
        &self,
        payload: &ViewSubmissionPayload,
        _ctx: &mut SlackContext,
        scope: ModalScope<'_>,
    ) -> HandlerResult<Option<ResponseAction>> {
        let comment = payload
            .view
            .state
            .as_ref()
            .and_then(|state| state.pointer("/values/comment/comment_input/value"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim();

        if comment.is_empty() {
            return Ok(Some(ResponseAction::error(
                COMMENT_BLOCK,
                "Please write something first",
            )));
        }

        info!(comment, "Feedback received");
        Ok(scope
            .child("thanks")
            .map(|thanks| ResponseAction::Push { view: thanks.view() }))
    }

    async fn update(
        &self,
        payload: &BlockActionsPayload,
        _ctx: &mut SlackContext,
        _scope: ModalScope<'_>,
    ) -> HandlerResult<Option<WebApiResponse>> {
        let user = payload.user.as_ref().map(|u| u.id.as_str());
        info!(user, "Comment cleared");
        Ok(None)
    }
}

struct Thanks;

#[async_trait]
impl Modal for Thanks {
    fn initial_view(&self) -> View {
        View::modal("feedback_thanks")
            .with_title("Thank you")
            .with_block(json!({
                "type": "section",
                "text": { "type": "mrkdwn", "text": "Your feedback was recorded." }
            }))
    }

    async fn submit(
        &self,
        _payload: &ViewSubmissionPayload,
        _ctx: &mut SlackContext,
        scope: ModalScope<'_>,
    ) -> HandlerResult<Option<ResponseAction>> {
        info!(parent = ?scope.parent().map(|p| p.callback_id()), "Closing feedback");
        Ok(Some(ResponseAction::Clear))
    }
}

fn feedback_tree() -> ModalNode {
    ModalNode::new("feedback", FeedbackForm)
        .update_on_actions(["clear_comment"])
        .child("thanks", ModalNode::new("feedback_thanks", Thanks))
}

// ============================================================================
// Pipeline
// ============================================================================

fn build_pipeline(client: Arc<dyn ViewClient>) -> Pipeline<Reply> {
    let modals = Arc::new(ModalStack::new(feedback_tree(), |result| {
        Ok(match result {
            ModalResult::Submit(action) => Reply::Response { action },
            ModalResult::Update(_) => Reply::Ack,
        })
    }));

    let open_feedback = {
        let modals = Arc::clone(&modals);
        move |cmd: SlashCommand| {
            let modals = Arc::clone(&modals);
            let client = Arc::clone(&client);
            async move {
                modals
                    .root()
                    .present(client.as_ref(), &cmd.trigger_id, None)
                    .await?;
                Ok::<_, BoxError>(Reply::Ack)
            }
        }
    };

    Pipeline::new()
        .name("modal_bot")
        .interceptor(TracingInterceptor)
        .error_interceptor(ErrorLoggingInterceptor)
        .handler(on_command("feedback").handler(open_feedback))
        .handler_arc(modals)
        .error_handler(catch_all_errors(|e: &BoxError| {
            let text = if e.is::<HandlerNotFound>() {
                "Sorry, I don't know that one.".to_string()
            } else {
                format!("Something went wrong: {e}")
            };
            async move { Ok::<_, BoxError>(Reply::Text { text }) }
        }))
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    if let Some(profile) = &args.profile {
        loader = loader.profile(profile);
    }

    let mut config = loader.load()?;
    if let Some(timeout_ms) = args.timeout_ms {
        config.runtime.timeout_ms = timeout_ms;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    validate_config(&config)?;

    let pipeline = build_pipeline(Arc::new(DryRunClient));
    let runtime = Runtime::from_config(pipeline, &config);

    info!("Reading envelopes from stdin");
    runtime
        .run_lines(BufReader::new(tokio::io::stdin()), |result| {
            let line = match result {
                Ok(reply) => serde_json::to_string(&reply),
                Err(e) => serde_json::to_string(&json!({ "error": e.to_string() })),
            };
            match line {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!(error = %e, "Failed to encode reply"),
            }
        })
        .await?;

    Ok(())
}
