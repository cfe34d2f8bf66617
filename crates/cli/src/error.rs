//! Error types for CLI operations.

use std::path::Path;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Payload could not be read as JSON
    #[error("Invalid JSON in {source_name}: {message}")]
    InvalidPayload {
        source_name: String,
        message: String,
    },

    /// The server or the client rejected the dispatch
    #[error("Event not recorded: {message}")]
    DispatchFailed { message: String },
}

impl CliError {
    pub fn config_not_found(path: &Path) -> Self {
        Self::ConfigNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn invalid_payload(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn dispatch_failed(message: impl Into<String>) -> Self {
        Self::DispatchFailed {
            message: message.into(),
        }
    }
}
