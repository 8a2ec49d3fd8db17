//! # Slackline
//!
//! A request dispatch pipeline for Slack apps.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────┐   ┌──────────────────────────────┐   ┌─────────────────────────┐
//! │ Runtime │──▶│ Pipeline                     │──▶│ request interceptors    │──▶ handler
//! │ (JSON)  │   │  first can_handle wins       │   └─────────────────────────┘
//! └─────────┘   │  errors → first error handler│──▶│ error interceptors      │──▶ error handler
//!               └──────────────────────────────┘   └─────────────────────────┘
//! ```
//!
//! - **Runtime**: parses socket-mode envelopes, applies a timeout, loads config
//! - **Pipeline**: selects one request handler, falls back to error handlers
//! - **Interceptors**: wrap the selected handler in registration order
//! - **Handlers**: payload handlers, grouped handlers and modal trees
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use slackline::prelude::*;
//!
//! async fn weather(cmd: SlashCommand) -> Result<String, BoxError> {
//!     Ok(format!("sunny in {}", cmd.text))
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::new()
//!         .interceptor(TracingInterceptor)
//!         .handler(on_command("weather").handler(weather))
//!         .error_handler(catch_all_errors(|e: &BoxError| {
//!             let reason = e.to_string();
//!             async move { Ok::<_, BoxError>(format!("sorry: {reason}")) }
//!         }));
//!
//!     let runtime = Runtime::builder().build(pipeline)?;
//!     runtime
//!         .run_lines(BufReader::new(tokio::io::stdin()), |reply| println!("{reply:?}"))
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: `slackline.toml` configuration files (default)
//! - `yaml-config`: `slackline.yaml` configuration files
//! - `json-log`: JSON log output

pub use slackline_core as core;
pub use slackline_framework as framework;
pub use slackline_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use slackline::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use slackline_runtime::{Runtime, RuntimeError, SlacklineConfig};

    // Pipeline, contracts and the request model
    pub use slackline_core::prelude::*;

    // Handler families and routing
    pub use slackline_framework::{
        ErrorLoggingInterceptor, Grouped, Modal, ModalNode, ModalResult, ModalScope, ModalStack,
        TracingInterceptor, ViewClient, catch_all, catch_all_errors, on, on_block_actions,
        on_command, on_error,
    };
}
