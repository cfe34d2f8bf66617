//! Adapts a callback transport to the async [`Transport`] seam

use contracts::{LegacyTransport, RequestDescriptor, Transport, TransportError};
use serde_json::Value;
use tokio::sync::oneshot;

/// Wraps a [`LegacyTransport`] so the dispatcher can await it
#[derive(Debug, Clone)]
pub struct CallbackAdapter<L> {
    inner: L,
}

impl<L: LegacyTransport> CallbackAdapter<L> {
    pub fn new(inner: L) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: LegacyTransport> Transport for CallbackAdapter<L> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn send(&self, request: RequestDescriptor) -> Result<Value, TransportError> {
        let (tx, rx) = oneshot::channel();
        self.inner.send(
            request,
            Box::new(move |err, body| {
                let result = match err {
                    Some(message) => Err(TransportError::Legacy { message }),
                    None => Ok(body.unwrap_or(Value::Null)),
                };
                let _ = tx.send(result);
            }),
        );

        rx.await.unwrap_or_else(|_| {
            Err(TransportError::network(
                "legacy transport dropped its callback",
            ))
        })
    }
}
