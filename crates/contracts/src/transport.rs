//! Transport traits - Dispatcher output interface
//!
//! Two call shapes: the async [`Transport`] every dispatch goes through, and
//! the callback-based [`LegacyTransport`] that adapters lift into it.

use serde_json::Value;

use crate::{DispatchError, RequestDescriptor, TransportError};

/// Completion callback for the callback-based transport
///
/// Invoked once with `(None, Some(body))` on success or
/// `(Some(message), None)` on failure.
pub type LegacyCallback = Box<dyn FnOnce(Option<String>, Option<Value>) + Send + 'static>;

/// Caller-supplied completion callback
///
/// Node-style: `(None, Some(body))` on success, `(Some(error), None)` on
/// failure. Invoked exactly once per dispatch.
pub type EventCallback = Box<dyn FnOnce(Option<DispatchError>, Option<Value>) + Send + 'static>;

/// Async transport
///
/// All dispatches go through this trait. Implementations are stateless per
/// call and may be used concurrently.
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Perform the request
    ///
    /// # Errors
    /// Returns [`TransportError::Status`] for responses >= 400, and the other
    /// variants for network, timeout and decode failures.
    async fn send(&self, request: RequestDescriptor) -> Result<Value, TransportError>;
}

/// Callback-based transport
///
/// `send` returns immediately; the outcome arrives through the callback.
pub trait LegacyTransport: Send + Sync {
    /// Transport name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Issue the request and report through `callback`
    fn send(&self, request: RequestDescriptor, callback: LegacyCallback);
}
