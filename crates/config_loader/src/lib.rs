//! # Config Loader
//!
//! Client configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Apply environment overrides for credentials
//! - Validate configuration before a client is built
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_from_path(Path::new("eventwire.toml")).unwrap();
//! println!("Project: {}", config.project_id);
//! ```

mod parser;
mod validator;

pub use contracts::ClientConfig;
pub use parser::ConfigFormat;
pub use validator::validate;

use contracts::{ConfigError, WriteKey};
use std::path::Path;
use tracing::debug;

/// Environment variable overriding `project_id`
pub const ENV_PROJECT_ID: &str = "EVENTWIRE_PROJECT_ID";
/// Environment variable overriding `write_key`
pub const ENV_WRITE_KEY: &str = "EVENTWIRE_WRITE_KEY";
/// Environment variable overriding `host`
pub const ENV_HOST: &str = "EVENTWIRE_HOST";

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<ClientConfig, ConfigError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<ClientConfig, ConfigError> {
        Self::parse_and_validate(content, format)
    }

    /// Load from file, then apply `EVENTWIRE_*` environment overrides
    pub fn load_with_env(path: &Path) -> Result<ClientConfig, ConfigError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        let mut config = parser::parse(&content, format)?;
        Self::apply_overrides(&mut config, |key| std::env::var(key).ok());
        validator::validate(&config)?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (env vars in production)
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(config: &mut ClientConfig, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(project_id) = lookup(ENV_PROJECT_ID) {
            debug!(var = ENV_PROJECT_ID, "Overriding project_id");
            config.project_id = project_id;
        }
        if let Some(write_key) = lookup(ENV_WRITE_KEY) {
            debug!(var = ENV_WRITE_KEY, "Overriding write_key");
            config.write_key = WriteKey::new(write_key);
        }
        if let Some(host) = lookup(ENV_HOST) {
            debug!(var = ENV_HOST, host = %host, "Overriding host");
            config.host = host;
        }
    }

    /// Serialize ClientConfig to TOML string
    ///
    /// The output contains the raw write key.
    pub fn to_toml(config: &ClientConfig) -> Result<String, ConfigError> {
        toml::to_string_pretty(config)
            .map_err(|e| ConfigError::parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize ClientConfig to JSON string
    ///
    /// The output contains the raw write key.
    pub fn to_json(config: &ClientConfig) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(config)
            .map_err(|e| ConfigError::parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::parse("cannot determine file format from extension"))?;

        ConfigFormat::from_extension(ext)
            .ok_or_else(|| ConfigError::parse(format!("unsupported config format: .{ext}")))
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, ConfigError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(content: &str, format: ConfigFormat) -> Result<ClientConfig, ConfigError> {
        let config = parser::parse(content, format)?;
        validator::validate(&config)?;
        Ok(config)
    }
}
