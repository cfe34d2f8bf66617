//! ClientConfig - client construction input
//!
//! Project identity, credentials, endpoint and transport selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Collection API version segment used in every resource path
pub const API_VERSION: &str = "3.0";

/// Client configuration
///
/// Immutable once a client is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Project identifier
    pub project_id: String,

    /// Write key (scoped credential for event ingestion)
    pub write_key: WriteKey,

    /// API host, optionally with port (e.g. "api.example.com", "localhost:8080")
    pub host: String,

    /// URL scheme
    pub protocol: Protocol,

    /// Transport used for every dispatch from this client
    #[serde(default)]
    pub transport_mode: TransportMode,

    /// Per-request timeout in milliseconds (unset = no transport timeout)
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    /// Retry policy handed to the transport (unset = single attempt)
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
}

impl ClientConfig {
    /// Create a config with default transport, no retry and no timeout
    pub fn new(
        project_id: impl Into<String>,
        write_key: impl Into<String>,
        host: impl Into<String>,
        protocol: Protocol,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            write_key: WriteKey::new(write_key),
            host: host.into(),
            protocol,
            transport_mode: TransportMode::default(),
            retry: None,
            timeout_ms: None,
        }
    }

    /// Select the transport mode
    pub fn with_transport_mode(mut self, mode: TransportMode) -> Self {
        self.transport_mode = mode;
        self
    }

    /// Attach a retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Set the per-request timeout
    ///
    /// Durations beyond `u64::MAX` milliseconds saturate.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Per-request timeout, if configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Base URL: `{protocol}://{host}`
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.host)
    }
}

/// Write key credential
///
/// `Debug` and `Display` never print the key itself. Serialization is
/// transparent and writes the raw key, so a config rendered with serde
/// (e.g. `ConfigLoader::to_toml`) carries the secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WriteKey(String);

impl WriteKey {
    /// Wrap a raw write key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Raw key as configured
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the key is empty after trimming
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Token sent in the `Authorization` header
    ///
    /// The collection API authenticates with the scoped write key itself, so
    /// the token is the key with surrounding whitespace removed. Stable for a
    /// given key.
    pub fn auth_token(&self) -> String {
        self.0.trim().to_string()
    }

    /// Key with all but the first four characters masked
    pub fn redacted(&self) -> String {
        let visible: String = self.0.chars().take(4).collect();
        format!("{visible}****")
    }
}

impl fmt::Debug for WriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WriteKey").field(&"<redacted>").finish()
    }
}

impl fmt::Display for WriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// URL scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport selection, fixed at client construction
#[allow(deprecated)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// Async HTTP transport
    #[default]
    #[serde(alias = "fetch")]
    Default,

    /// Callback-based transport kept for backward compatibility
    #[deprecated(note = "the legacy callback transport is kept for compatibility only; use TransportMode::Default")]
    #[serde(alias = "xhr")]
    Legacy,
}

impl TransportMode {
    /// Whether this is the deprecated callback transport
    #[allow(deprecated)]
    pub fn is_legacy(&self) -> bool {
        matches!(self, TransportMode::Legacy)
    }
}

/// Retry policy passed through to the transport
///
/// The dispatcher never retries on its own; transports decide how to apply
/// this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on each further retry
    #[serde(default = "default_base_backoff_ms")]
    pub base_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_backoff_ms() -> u64 {
    200
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_backoff_ms: default_base_backoff_ms(),
        }
    }
}

impl RetryPolicy {
    /// Attempts, never below one
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay before the given retry (1-based), capped at 2^8 times the base
    pub fn backoff(&self, retry_number: u32) -> Duration {
        let shift = retry_number.saturating_sub(1).min(8);
        Duration::from_millis(self.base_backoff_ms).saturating_mul(1u32 << shift)
    }
}
