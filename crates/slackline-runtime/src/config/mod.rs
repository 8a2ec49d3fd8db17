//! Configuration loading and validation.
//!
//! Settings come from defaults, `slackline.toml` files and `SLACKLINE_*`
//! environment variables, layered by [`ConfigLoader`].

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, ENV_PREFIX, Profile, load_config, load_config_from_file};
pub use schema::{
    LogFormat, LogLevel, LogOutput, LoggingConfig, PipelineConfig, RuntimeOptions,
    SlacklineConfig, SpanEventConfig,
};
pub use validation::validate_config;
