//! Configuration validation.

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogLevel, LogOutput, LoggingConfig, SlacklineConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &SlacklineConfig) -> ConfigResult<()> {
    if config.runtime.timeout_ms == 0 {
        return Err(ConfigError::validation("Timeout must be greater than 0"));
    }

    if let Some(name) = &config.pipeline.name
        && name.trim().is_empty()
    {
        return Err(ConfigError::validation("Pipeline name cannot be blank"));
    }

    validate_logging(&config.logging)
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    validate_level("logging.level", &logging.level)?;

    for (target, level) in &logging.filters {
        validate_level(&format!("logging.filters.{target}"), level)?;
    }

    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when output is \"file\"",
        ));
    }

    Ok(())
}

fn validate_level(field: &str, level: &str) -> ConfigResult<()> {
    level.parse::<LogLevel>().map(drop).map_err(|invalid| {
        let valid: Vec<&str> = LogLevel::ALL.iter().map(LogLevel::as_str).collect();
        ConfigError::validation(format!(
            "Invalid log level for {field}: {invalid}. Valid values are: {valid:?}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&SlacklineConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = SlacklineConfig::default();
        config.logging.level = "loud".to_string();

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("logging.level: loud"));
    }

    #[test]
    fn test_validate_invalid_filter_level() {
        let mut config = SlacklineConfig::default();
        config
            .logging
            .filters
            .insert("slackline_core".to_string(), "verbose".to_string());

        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = SlacklineConfig::default();
        config.runtime.timeout_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = SlacklineConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("slackline.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
