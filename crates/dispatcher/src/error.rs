//! Client construction errors

use contracts::ConfigError;
use thiserror::Error;

/// Errors raised while building a client
///
/// The only failures that surface outside the completion channels.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid or unreadable configuration
    #[error("invalid client configuration: {0}")]
    Config(#[from] ConfigError),

    /// Transport creation error
    #[error("failed to create transport '{name}': {message}")]
    TransportCreation { name: String, message: String },
}

impl ClientError {
    /// Create a transport creation error
    pub fn transport_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
