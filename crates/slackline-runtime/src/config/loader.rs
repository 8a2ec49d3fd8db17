//! Configuration loader using figment.
//!
//! # Sources (lowest to highest priority)
//!
//! 1. Built-in defaults
//! 2. Programmatic defaults passed to [`ConfigLoader::merge`]
//! 3. Profile-specific file (`slackline.{profile}.toml`)
//! 4. Main file (`slackline.toml`)
//! 5. Environment variables (`SLACKLINE_*`)
//!
//! Files are searched in the current directory and then in
//! `<user config dir>/slackline`, unless search paths are given explicitly.
//! The first directory holding a main file wins.
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: `slackline.toml`
//! - `yaml-config`: `slackline.yaml` / `slackline.yml`
//!
//! # Environment Variable Mapping
//!
//! `__` separates nesting levels:
//!
//! - `SLACKLINE_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `SLACKLINE_RUNTIME__TIMEOUT_MS=5000` → `runtime.timeout_ms = 5000`
//! - `SLACKLINE_PIPELINE__REQUEST_HANDLER_TRIGGERS_ERROR_HANDLERS=false`
//!
//! ```rust,ignore
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .load()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace};

use super::error::{ConfigError, ConfigResult};
use super::schema::SlacklineConfig;
use super::validation::validate_config;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SLACKLINE_";

/// Configuration profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    #[default]
    Development,
    Production,
    Custom(String),
}

impl Profile {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads `SLACKLINE_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var("SLACKLINE_PROFILE")
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Layered configuration loader.
pub struct ConfigLoader {
    figment: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Adds a directory to search. Replaces the default search paths.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Loads exactly this file instead of searching.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Layers `config` over the built-in defaults. Files and the environment
    /// still override it.
    pub fn merge(mut self, config: SlacklineConfig) -> Self {
        self.figment = self.figment.merge(Serialized::defaults(config));
        self
    }

    /// Loads the configuration without validating it.
    pub fn load(self) -> ConfigResult<SlacklineConfig> {
        let profile = self.profile.clone();
        let config: SlacklineConfig = self.build_figment()?.extract()?;

        debug!(
            profile = %profile,
            level = %config.logging.level,
            timeout_ms = config.runtime.timeout_ms,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Loads and validates the configuration.
    pub fn load_validated(self) -> ConfigResult<SlacklineConfig> {
        let config = self.load()?;
        validate_config(&config)?;
        Ok(config)
    }

    fn build_figment(mut self) -> ConfigResult<Figment> {
        let user = std::mem::take(&mut self.figment);
        let mut figment = Figment::from(Serialized::defaults(SlacklineConfig::default())).merge(user);

        figment = match self.config_file.take() {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "Loading configuration file");
                Self::merge_file(figment, &path)?
            }
            Some(path) => return Err(ConfigError::FileNotFound(path)),
            None => self.merge_search_paths(figment),
        };

        if self.load_env {
            trace!(prefix = ENV_PREFIX, "Loading environment variables");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        Ok(figment)
    }

    fn merge_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => Err(ConfigError::ParseError(format!(
                "unsupported or disabled configuration format: .{ext}"
            ))),
        }
    }

    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }

        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("slackline"));
        }
        paths
    }

    /// Candidate file names, in preference order, for the enabled formats.
    fn base_names() -> Vec<&'static str> {
        let mut names = Vec::new();
        #[cfg(feature = "toml-config")]
        names.push("slackline.toml");
        #[cfg(feature = "yaml-config")]
        names.extend(["slackline.yaml", "slackline.yml"]);
        names
    }

    fn merge_search_paths(&self, mut figment: Figment) -> Figment {
        let base_names = Self::base_names();

        for dir in self.resolve_search_paths() {
            for base_name in &base_names {
                let Some((stem, ext)) = base_name.rsplit_once('.') else {
                    continue;
                };

                let profile_path = dir.join(format!("{stem}.{}.{ext}", self.profile));
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile configuration");
                    if let Ok(merged) = Self::merge_file(figment.clone(), &profile_path) {
                        figment = merged;
                    }
                }

                let base_path = dir.join(base_name);
                if base_path.exists() {
                    info!(path = %base_path.display(), "Loading configuration file");
                    return Self::merge_file(figment.clone(), &base_path).unwrap_or(figment);
                }
            }
        }

        debug!("No configuration file found, using defaults");
        figment
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<SlacklineConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from a specific file, plus the environment.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<SlacklineConfig> {
    ConfigLoader::new().file(path).load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_files() {
        let empty = std::env::temp_dir().join("slackline-config-test-empty");
        let config = ConfigLoader::new()
            .without_env()
            .search_path(&empty)
            .load()
            .unwrap();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.runtime.timeout_ms, 3000);
    }

    #[test]
    fn test_missing_explicit_file() {
        let result = ConfigLoader::new()
            .without_env()
            .file("/definitely/not/here/slackline.toml")
            .load();
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_merge_overrides_defaults() {
        let mut overrides = SlacklineConfig::default();
        overrides.runtime.timeout_ms = 250;
        overrides.pipeline.request_handler_triggers_error_handlers = Some(false);

        let config = ConfigLoader::new()
            .without_env()
            .search_path(std::env::temp_dir().join("slackline-config-test-merge"))
            .merge(overrides)
            .load()
            .unwrap();

        assert_eq!(config.runtime.timeout_ms, 250);
        assert_eq!(config.pipeline.request_handler_triggers_error_handlers, Some(false));
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!(Profile::parse("prod"), Profile::Production);
        assert_eq!(Profile::parse("Dev"), Profile::Development);
        assert_eq!(Profile::parse("staging").to_string(), "staging");
    }

    #[cfg(feature = "toml-config")]
    #[test]
    fn test_profile_file_is_overridden_by_main_file() {
        let dir = std::env::temp_dir().join(format!("slackline-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("slackline.staging.toml"),
            "[runtime]\ntimeout_ms = 100\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();
        std::fs::write(dir.join("slackline.toml"), "[runtime]\ntimeout_ms = 200\n").unwrap();

        let config = ConfigLoader::new()
            .without_env()
            .profile("staging")
            .search_path(&dir)
            .load()
            .unwrap();

        assert_eq!(config.runtime.timeout_ms, 200);
        assert_eq!(config.logging.level, "debug");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
