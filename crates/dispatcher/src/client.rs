//! EventClient - configured dispatcher with the transport chosen by config

#![allow(deprecated)]

use std::path::Path;

use contracts::{ClientConfig, EventCallback, RequestDescriptor, Transport, TransportError};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::completion::DispatchFuture;
use crate::dispatcher::Dispatcher;
use crate::error::ClientError;
use crate::gate::Gate;
use crate::metrics::MetricsSnapshot;
use crate::request::RequestBuilder;
use crate::transports::{CallbackAdapter, FetchTransport, XhrTransport};

/// Transport picked once from `transport_mode`
#[derive(Debug, Clone)]
pub enum SelectedTransport {
    Fetch(FetchTransport),
    Legacy(CallbackAdapter<XhrTransport>),
}

impl SelectedTransport {
    /// Build the transport named by the config
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        if config.transport_mode.is_legacy() {
            warn!("Legacy callback transport selected; it is deprecated and will be removed");
            Ok(Self::Legacy(CallbackAdapter::new(XhrTransport::new("xhr"))))
        } else {
            Ok(Self::Fetch(FetchTransport::new("fetch")?))
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }
}

impl Transport for SelectedTransport {
    fn name(&self) -> &str {
        match self {
            Self::Fetch(t) => t.name(),
            Self::Legacy(t) => t.name(),
        }
    }

    async fn send(&self, request: RequestDescriptor) -> Result<Value, TransportError> {
        match self {
            Self::Fetch(t) => t.send(request).await,
            Self::Legacy(t) => t.send(request).await,
        }
    }
}

/// Analytics event client
///
/// ```no_run
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// use dispatcher::{ClientConfig, EventClient, Protocol};
/// use serde_json::json;
///
/// let config = ClientConfig::new("project", "write-key", "api.keen.io", Protocol::Https);
/// let client = EventClient::new(config)?;
/// let body = client
///     .record_event("purchases", json!({"item": "golden gadget"}), None)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct EventClient {
    inner: Dispatcher<SelectedTransport>,
}

impl EventClient {
    /// Client bound to the process-wide gate
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_gate(config, Gate::global())
    }

    /// Client bound to `gate`
    #[instrument(
        name = "event_client_new",
        skip(config, gate),
        fields(project_id = %config.project_id, host = %config.host)
    )]
    pub fn with_gate(config: ClientConfig, gate: Gate) -> Result<Self, ClientError> {
        // Dispatcher::new validates the config
        let transport = SelectedTransport::from_config(&config)?;
        let inner = Dispatcher::new(config, transport, gate)?;

        info!(transport = %inner.transport().name(), "Event client ready");
        Ok(Self { inner })
    }

    /// Load configuration from a TOML or JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let config = config_loader::ConfigLoader::load_from_path(path.as_ref())?;
        Self::new(config)
    }

    /// Record one event; see [`Dispatcher::record_event`]
    pub fn record_event(
        &self,
        collection: &str,
        properties: Value,
        callback: Option<EventCallback>,
    ) -> DispatchFuture {
        self.inner.record_event(collection, properties, callback)
    }

    /// Record a batch; see [`Dispatcher::record_events`]
    pub fn record_events(
        &self,
        batch: impl Into<Value>,
        callback: Option<EventCallback>,
    ) -> DispatchFuture {
        self.inner.record_events(batch, callback)
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.config()
    }

    /// `"fetch"` or `"xhr"`
    pub fn transport_name(&self) -> &str {
        self.inner.transport().name()
    }

    pub fn is_legacy(&self) -> bool {
        self.inner.transport().is_legacy()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics().snapshot()
    }

    pub fn gate(&self) -> &Gate {
        self.inner.gate()
    }

    /// Builder producing this client's request descriptors
    pub fn request_builder(&self) -> &RequestBuilder {
        self.inner.request_builder()
    }
}

impl std::fmt::Debug for EventClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventClient")
            .field("config", self.config())
            .field("transport", &self.transport_name())
            .finish()
    }
}
