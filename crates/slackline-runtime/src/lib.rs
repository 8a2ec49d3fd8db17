//! Slackline Runtime - configuration, logging and the dispatch loop.
//!
//! This crate provides:
//! - Layered configuration (`slackline.toml`, `SLACKLINE_*` environment
//!   variables, programmatic overrides) via [`ConfigLoader`]
//! - Logging setup on `tracing-subscriber` ([`LoggingBuilder`])
//! - [`Runtime`], which parses socket-mode envelopes and runs them through a
//!   pipeline under a timeout
//!
//! ```ignore
//! use slackline_runtime::Runtime;
//! use tokio::io::BufReader;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = Runtime::builder().build(build_pipeline())?;
//!     runtime
//!         .run_lines(BufReader::new(tokio::io::stdin()), |reply| println!("{reply:?}"))
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{
    ConfigError, ConfigLoader, ConfigResult, LoggingConfig, PipelineConfig, RuntimeOptions,
    SlacklineConfig, validate_config,
};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeStats};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Logging macros, for handler code that does not depend on `tracing`
/// directly.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
