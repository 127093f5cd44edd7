//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{CoreConfig, HooklineConfig, LogOutput, LoggingConfig, TestingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &HooklineConfig) -> ConfigResult<()> {
    validate_core_config(&config.core)?;
    validate_logging_config(&config.logging)?;
    validate_testing_config(&config.testing)?;
    Ok(())
}

fn validate_core_config(core: &CoreConfig) -> ConfigResult<()> {
    validate_nick("core.nick", &core.nick)?;

    if core.help_prefix.is_empty() {
        return Err(ConfigError::missing_field("core.help_prefix"));
    }

    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if logging.filters.keys().any(|module| module.trim().is_empty()) {
        return Err(ConfigError::validation(
            "Logging filter module names cannot be empty",
        ));
    }

    Ok(())
}

fn validate_testing_config(testing: &TestingConfig) -> ConfigResult<()> {
    validate_nick("testing.nick", &testing.nick)?;

    if !testing.channel.starts_with(['#', '&']) {
        return Err(ConfigError::InvalidChannel(testing.channel.clone()));
    }

    Ok(())
}

/// Validates a nick.
fn validate_nick(field: &str, nick: &str) -> ConfigResult<()> {
    if nick.is_empty() || nick.chars().any(char::is_whitespace) {
        return Err(ConfigError::invalid_nick(field, nick));
    }
    Ok(())
}
