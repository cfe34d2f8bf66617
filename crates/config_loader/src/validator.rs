//! Config validation
//!
//! Rules:
//! - project_id non-empty
//! - write_key non-blank
//! - host non-empty, no scheme, no path, no whitespace
//! - retry.max_attempts >= 1
//! - timeout_ms > 0 when set

use contracts::{ClientConfig, ConfigError};

/// Validate a ClientConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &ClientConfig) -> Result<(), ConfigError> {
    validate_project_id(config)?;
    validate_write_key(config)?;
    validate_host(config)?;
    validate_retry(config)?;
    validate_timeout(config)?;
    Ok(())
}

fn validate_project_id(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.project_id.trim().is_empty() {
        return Err(ConfigError::validation(
            "project_id",
            "project_id cannot be empty",
        ));
    }
    Ok(())
}

fn validate_write_key(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.write_key.is_blank() {
        return Err(ConfigError::validation(
            "write_key",
            "write_key cannot be empty",
        ));
    }
    Ok(())
}

fn validate_host(config: &ClientConfig) -> Result<(), ConfigError> {
    let host = &config.host;

    if host.trim().is_empty() {
        return Err(ConfigError::validation("host", "host cannot be empty"));
    }

    if host.contains("://") {
        return Err(ConfigError::validation(
            "host",
            format!("host '{host}' must not include a scheme; set protocol instead"),
        ));
    }

    if host.contains('/') {
        return Err(ConfigError::validation(
            "host",
            format!("host '{host}' must not include a path"),
        ));
    }

    if host.chars().any(char::is_whitespace) {
        return Err(ConfigError::validation(
            "host",
            format!("host '{host}' contains whitespace"),
        ));
    }

    Ok(())
}

fn validate_retry(config: &ClientConfig) -> Result<(), ConfigError> {
    if let Some(retry) = &config.retry {
        if retry.max_attempts == 0 {
            return Err(ConfigError::validation(
                "retry.max_attempts",
                "max_attempts must be >= 1",
            ));
        }
    }
    Ok(())
}

fn validate_timeout(config: &ClientConfig) -> Result<(), ConfigError> {
    if config.timeout_ms == Some(0) {
        return Err(ConfigError::validation(
            "timeout_ms",
            "timeout_ms must be > 0 when set",
        ));
    }
    Ok(())
}
