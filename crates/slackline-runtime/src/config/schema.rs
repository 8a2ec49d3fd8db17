//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use slackline_core::PipelineOptions;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlacklineConfig {
    /// Overrides for the dispatch pipeline's options.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Dispatch loop settings.
    #[serde(default)]
    pub runtime: RuntimeOptions,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Pipeline option overrides.
///
/// Unset fields keep whatever the pipeline was built with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_handler_triggers_error_handlers: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PipelineConfig {
    /// Applies the set fields on top of `options`.
    pub fn apply_to(&self, mut options: PipelineOptions) -> PipelineOptions {
        if let Some(enabled) = self.request_handler_triggers_error_handlers {
            options.request_handler_triggers_error_handlers = enabled;
        }
        if let Some(name) = &self.name {
            options.name = Some(name.clone());
        }
        options
    }
}

/// Settings for [`Runtime`](crate::Runtime).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeOptions {
    /// Upper bound for one dispatch, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl RuntimeOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

// Slack expects an acknowledgement within three seconds.
fn default_timeout_ms() -> u64 {
    3000
}

// =============================================================================
// Logging
// =============================================================================

/// A log verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to `full` without it.
    Json,
}

/// Where log lines are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    /// Keeps stdout free for dispatch output.
    #[default]
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

/// Logging configuration.
///
/// Levels are kept as strings so a typo is reported by
/// [`validate_config`](super::validate_config) with the offending value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Base level, e.g. `"info"`.
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    pub span_events: SpanEventConfig,
    pub thread_ids: bool,
    /// Include file names and line numbers.
    pub file_location: bool,
    /// Log file path when `output = "file"`.
    pub file_path: Option<PathBuf>,
    /// Per-target levels, e.g. `slackline_core = "debug"`.
    pub filters: BTreeMap<String, String>,
}

impl LoggingConfig {
    /// The base level, or `info` when it does not parse.
    pub fn base_level(&self) -> LogLevel {
        self.level.parse().unwrap_or_default()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info.as_str().to_string(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            file_path: None,
            filters: BTreeMap::new(),
        }
    }
}
