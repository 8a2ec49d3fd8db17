//! Dispatch loop around a [`Pipeline`].
//!
//! ```rust,ignore
//! let runtime = Runtime::builder()
//!     .profile("production")
//!     .build(pipeline)?;
//!
//! // One envelope
//! let reply = runtime.dispatch_json(raw).await?;
//!
//! // Newline-delimited envelopes until EOF or Ctrl+C
//! runtime
//!     .run_lines(BufReader::new(tokio::io::stdin()), |result| println!("{result:?}"))
//!     .await?;
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::signal;
use tracing::{debug, error, info, warn};

use slackline_core::{Envelope, HandlerResult, Pipeline, SlackRequest};

use crate::config::{ConfigLoader, ConfigResult, RuntimeOptions, SlacklineConfig};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// Counters for a [`Runtime`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Dispatches that reached the pipeline.
    pub dispatched: u64,
    /// Dispatches that ended in an error, timeouts included.
    pub failed: u64,
    pub timed_out: u64,
}

#[derive(Debug, Default)]
struct Counters {
    dispatched: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
}

/// Runs envelopes through a pipeline under a timeout.
///
/// Cloning is cheap; clones share the pipeline and the counters.
pub struct Runtime<R> {
    pipeline: Pipeline<R>,
    options: RuntimeOptions,
    counters: Arc<Counters>,
}

impl<R> Clone for Runtime<R> {
    fn clone(&self) -> Self {
        Self {
            pipeline: self.pipeline.clone(),
            options: self.options.clone(),
            counters: Arc::clone(&self.counters),
        }
    }
}

impl<R: Send + 'static> Runtime<R> {
    /// Creates a runtime with default options.
    pub fn new(pipeline: Pipeline<R>) -> Self {
        Self {
            pipeline,
            options: RuntimeOptions::default(),
            counters: Arc::default(),
        }
    }

    /// Creates a runtime from loaded configuration.
    ///
    /// Installs the configured logging unless a subscriber already exists.
    /// Pipeline options set in the config override those set in code;
    /// options the config leaves out are kept.
    pub fn from_config(pipeline: Pipeline<R>, config: &SlacklineConfig) -> Self {
        if let Err(e) = logging::init_from_config(&config.logging) {
            debug!(error = %e, "Logging already initialised");
        }

        let options = config.pipeline.apply_to(pipeline.options().clone());

        info!(
            pipeline = options.name.as_deref().unwrap_or("unnamed"),
            timeout_ms = config.runtime.timeout_ms,
            "Runtime configured"
        );

        Self::new(pipeline.with_options(options)).with_options(config.runtime.clone())
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn with_options(mut self, options: RuntimeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn pipeline(&self) -> &Pipeline<R> {
        &self.pipeline
    }

    pub fn options(&self) -> &RuntimeOptions {
        &self.options
    }

    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            timed_out: self.counters.timed_out.load(Ordering::Relaxed),
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Parses one socket-mode envelope and dispatches it.
    pub async fn dispatch_json(&self, raw: &str) -> RuntimeResult<R> {
        let envelope = Envelope::parse(raw).inspect_err(|e| {
            warn!(error = %e, "Discarding unparseable envelope");
        })?;
        self.dispatch(envelope).await
    }

    /// Dispatches an envelope. The envelope is visible to handlers.
    pub async fn dispatch(&self, envelope: Envelope) -> RuntimeResult<R> {
        debug!(envelope_id = ?envelope.envelope_id, kind = ?envelope.kind, "Dispatching envelope");
        self.timed(self.pipeline.process_envelope(envelope)).await
    }

    /// Dispatches an already adapted request.
    pub async fn dispatch_request(&self, request: SlackRequest) -> RuntimeResult<R> {
        self.timed(self.pipeline.process(request)).await
    }

    async fn timed<F>(&self, dispatch: F) -> RuntimeResult<R>
    where
        F: Future<Output = HandlerResult<R>>,
    {
        self.counters.dispatched.fetch_add(1, Ordering::Relaxed);
        let limit = self.options.timeout();

        let result = match tokio::time::timeout(limit, dispatch).await {
            Ok(Ok(response)) => return Ok(response),
            Ok(Err(e)) => RuntimeError::Pipeline(e),
            Err(_) => {
                self.counters.timed_out.fetch_add(1, Ordering::Relaxed);
                RuntimeError::Timeout(limit)
            }
        };

        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        warn!(error = %result, "Dispatch failed");
        Err(result)
    }

    // =========================================================================
    // Serving
    // =========================================================================

    /// Dispatches newline-delimited envelopes from `input` until EOF, Ctrl+C
    /// or SIGTERM.
    pub async fn run_lines<I, F>(&self, input: I, on_result: F) -> RuntimeResult<()>
    where
        I: AsyncBufRead + Unpin,
        F: FnMut(RuntimeResult<R>),
    {
        self.run_lines_until(input, on_result, wait_for_shutdown())
            .await
    }

    /// Like [`run_lines`](Self::run_lines), stopping when `shutdown`
    /// completes instead of on a signal.
    ///
    /// Envelopes are dispatched one at a time in input order. Blank lines are
    /// skipped. `shutdown` is only checked between envelopes, so an envelope
    /// already being dispatched runs to completion (bounded by the timeout).
    pub async fn run_lines_until<I, F, S>(
        &self,
        input: I,
        mut on_result: F,
        shutdown: S,
    ) -> RuntimeResult<()>
    where
        I: AsyncBufRead + Unpin,
        F: FnMut(RuntimeResult<R>),
        S: Future<Output = ()>,
    {
        let mut lines = input.lines();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping");
                    break;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        debug!("Input closed");
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }
                    on_result(self.dispatch_json(&line).await);
                }
            }
        }

        let stats = self.stats();
        info!(
            dispatched = stats.dispatched,
            failed = stats.failed,
            timed_out = stats.timed_out,
            "Runtime stopped"
        );
        Ok(())
    }
}

/// Waits for Ctrl+C or, on unix, SIGTERM.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl+C, running until input ends");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Loads configuration and builds a [`Runtime`] from it.
///
/// ```rust,ignore
/// let runtime = Runtime::builder()
///     .config_file("config/slackline.toml")
///     .build(pipeline)?;
/// ```
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    pub fn merge(mut self, config: SlacklineConfig) -> Self {
        self.config_loader = self.config_loader.merge(config);
        self
    }

    /// Loads and validates configuration, then builds the runtime.
    pub fn build<R: Send + 'static>(self, pipeline: Pipeline<R>) -> ConfigResult<Runtime<R>> {
        let config = self.config_loader.load_validated()?;
        Ok(Runtime::from_config(pipeline, &config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
