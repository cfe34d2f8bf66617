//! Layered error definitions
//!
//! Categorized by phase: construction (config) / dispatch / transport

use serde_json::Value;
use thiserror::Error;

/// Per-call dispatch failure
///
/// Always delivered through the completion channels, never thrown. `Clone`
/// so the same failure can reach both the future and the callback.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// Kill switch is off
    #[error("event not recorded: {message}")]
    Disabled { message: String },

    /// Malformed collection name or batch shape
    #[error("event not recorded: {message}")]
    Validation { message: String },

    /// Network, timeout or HTTP failure
    #[error("request failed: {0}")]
    Transport(#[from] TransportError),

    /// Failure inside the client itself (e.g. no async runtime)
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DispatchError {
    /// Create kill-switch error
    pub fn disabled(message: impl Into<String>) -> Self {
        Self::Disabled {
            message: message.into(),
        }
    }

    /// Create validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the call failed before any network activity
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, Self::Disabled { .. } | Self::Validation { .. })
    }

    /// HTTP status, when the failure came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(TransportError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Disabled { .. } => "disabled",
            Self::Validation { .. } => "validation",
            Self::Transport(e) => e.kind(),
            Self::Internal { .. } => "internal",
        }
    }
}

/// Transport-level failure
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Response with status >= 400
    #[error("HTTP {status}{}", detail_suffix(.detail))]
    Status { status: u16, detail: Option<Value> },

    /// Request exceeded the configured timeout
    #[error("timed out: {message}")]
    Timeout { message: String },

    /// Connection or I/O failure
    #[error("network error: {message}")]
    Network { message: String },

    /// Success response whose body is not JSON
    #[error("invalid response body: {message}")]
    Decode { message: String },

    /// Error message reported by the callback transport
    #[error("{message}")]
    Legacy { message: String },
}

fn detail_suffix(detail: &Option<Value>) -> String {
    match detail {
        Some(value) => format!(": {value}"),
        None => String::new(),
    }
}

impl TransportError {
    /// Create network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "http_status",
            Self::Timeout { .. } => "timeout",
            Self::Network { .. } => "network",
            Self::Decode { .. } => "decode",
            Self::Legacy { .. } => "legacy",
        }
    }
}

/// Client construction error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration parse error
    #[error("config parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    Validation { field: String, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Create configuration parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
