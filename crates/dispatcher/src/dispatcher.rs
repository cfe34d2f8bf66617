//! Dispatcher - gate, validate, build, send, complete

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use contracts::{ClientConfig, DispatchError, EventCallback, RequestDescriptor, Transport};
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, info_span, instrument, warn, Instrument};

use crate::completion::{self, Completion, DispatchFuture};
use crate::error::ClientError;
use crate::gate::Gate;
use crate::metrics::DispatchMetrics;
use crate::request::RequestBuilder;
use crate::validator;

/// Which call produced a dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    Single,
    Batch,
}

impl DispatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Batch => "batch",
        }
    }
}

impl fmt::Display for DispatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs dispatches against one transport
///
/// Each call passes the gate, validation and request building synchronously;
/// only the transport send runs on a spawned task. Failures before the send
/// complete before `record_*` returns.
pub struct Dispatcher<T> {
    config: Arc<ClientConfig>,
    builder: Arc<RequestBuilder>,
    transport: Arc<T>,
    gate: Gate,
    metrics: Arc<DispatchMetrics>,
}

impl<T> Clone for Dispatcher<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            builder: Arc::clone(&self.builder),
            transport: Arc::clone(&self.transport),
            gate: self.gate.clone(),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<T: Transport + Sync + 'static> Dispatcher<T> {
    /// Create a dispatcher
    ///
    /// # Errors
    /// Returns [`ClientError::Config`] when the configuration is invalid.
    pub fn new(config: ClientConfig, transport: T, gate: Gate) -> Result<Self, ClientError> {
        config_loader::validate(&config)?;
        let builder = RequestBuilder::new(&config)?;

        Ok(Self {
            config: Arc::new(config),
            builder: Arc::new(builder),
            transport: Arc::new(transport),
            gate,
            metrics: Arc::new(DispatchMetrics::new()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn gate(&self) -> &Gate {
        &self.gate
    }

    pub fn metrics(&self) -> &DispatchMetrics {
        &self.metrics
    }

    pub fn request_builder(&self) -> &RequestBuilder {
        &self.builder
    }

    /// Record one event in `collection`
    #[instrument(
        name = "dispatch_record_event",
        skip(self, properties, callback),
        fields(transport = %self.transport.name())
    )]
    pub fn record_event(
        &self,
        collection: &str,
        properties: Value,
        callback: Option<EventCallback>,
    ) -> DispatchFuture {
        let (completion, future) = completion::channel(callback);

        let prepared = self
            .gate
            .check()
            .and_then(|()| validator::validate_single(collection, properties))
            .and_then(|request| self.builder.build_single(&request));

        self.launch(DispatchKind::Single, prepared, completion);
        future
    }

    /// Record a batch: collection name -> array of events
    #[instrument(
        name = "dispatch_record_events",
        skip(self, batch, callback),
        fields(transport = %self.transport.name())
    )]
    pub fn record_events(
        &self,
        batch: impl Into<Value>,
        callback: Option<EventCallback>,
    ) -> DispatchFuture {
        let (completion, future) = completion::channel(callback);

        let prepared = self
            .gate
            .check()
            .and_then(|()| validator::validate_batch(batch.into()))
            .and_then(|request| {
                observability::record_batch_size(request.len(), request.event_count());
                self.builder.build_batch(&request)
            });

        self.launch(DispatchKind::Batch, prepared, completion);
        future
    }

    fn launch(
        &self,
        kind: DispatchKind,
        prepared: Result<RequestDescriptor, DispatchError>,
        completion: Completion,
    ) {
        let request = match prepared {
            Ok(request) => request,
            Err(err) => return self.short_circuit(kind, err, completion),
        };

        let Ok(handle) = Handle::try_current() else {
            let err = DispatchError::internal("no async runtime available to send the request");
            return self.short_circuit(kind, err, completion);
        };

        let transport = Arc::clone(&self.transport);
        let metrics = Arc::clone(&self.metrics);
        let span = info_span!(
            "dispatch_send",
            kind = %kind,
            transport = %transport.name(),
            url = %request.url
        );

        metrics.start_dispatch();
        handle.spawn(
            async move {
                let started = Instant::now();
                let result = transport.send(request).await;
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

                let name = transport.name();
                metrics.finish_dispatch(result.is_ok());
                observability::record_dispatch(kind.as_str(), name, result.is_ok());
                observability::record_dispatch_latency_ms(name, elapsed_ms);

                match &result {
                    Ok(_) => debug!(elapsed_ms, "Dispatch succeeded"),
                    Err(e) => {
                        warn!(elapsed_ms, error = %e, "Dispatch failed");
                        observability::record_dispatch_failure(kind.as_str(), e.kind());
                    }
                }

                completion.complete(result.map_err(DispatchError::from));
            }
            .instrument(span),
        );
    }

    fn short_circuit(&self, kind: DispatchKind, err: DispatchError, completion: Completion) {
        debug!(kind = %kind, reason = err.kind(), error = %err, "Dispatch short-circuited");
        self.metrics.inc_short_circuited();
        observability::record_short_circuit(err.kind());
        completion.complete(Err(err));
    }
}
