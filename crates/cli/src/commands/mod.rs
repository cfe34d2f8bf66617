//! Command implementations.

mod batch;
mod info;
mod record;
mod validate;

pub use batch::run_batch;
pub use info::run_info;
pub use record::run_record;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::ClientConfig;
use serde_json::Value;

use crate::error::CliError;

/// Load configuration with `EVENTWIRE_*` overrides applied
pub(crate) fn load_config(path: &Path) -> Result<ClientConfig> {
    if !path.exists() {
        return Err(CliError::config_not_found(path).into());
    }

    config_loader::ConfigLoader::load_with_env(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Parse a JSON payload; key order is kept as written
pub(crate) fn parse_json(source_name: &str, text: &str) -> Result<Value, CliError> {
    serde_json::from_str(text).map_err(|e| CliError::invalid_payload(source_name, e.to_string()))
}

/// Read and parse a JSON payload file
pub(crate) fn read_json_file(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_json(&path.display().to_string(), &text)?)
}
