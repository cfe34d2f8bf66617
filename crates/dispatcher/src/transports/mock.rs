//! MockTransport - deterministic in-process transport for tests

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use contracts::{LegacyCallback, LegacyTransport, RequestDescriptor, Transport, TransportError};
use serde_json::{json, Value};
use tracing::debug;

#[derive(Debug)]
struct MockState {
    status: u16,
    body: Value,
    delay: Option<Duration>,
    requests: Mutex<Vec<RequestDescriptor>>,
}

/// Answers every request with a fixed status and body
///
/// Clones share captured requests.
#[derive(Debug, Clone)]
pub struct MockTransport {
    name: String,
    state: Arc<MockState>,
}

impl MockTransport {
    /// Respond with `status` and `body`; status >= 400 is a failure
    pub fn responding(status: u16, body: Value) -> Self {
        Self {
            name: "mock".to_string(),
            state: Arc::new(MockState {
                status,
                body,
                delay: None,
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    /// 200 with `{"created": true}`
    pub fn ok_json() -> Self {
        Self::responding(200, json!({"created": true}))
    }

    /// Delay every async response
    pub fn with_delay(self, delay: Duration) -> Self {
        let state = MockState {
            status: self.state.status,
            body: self.state.body.clone(),
            delay: Some(delay),
            requests: Mutex::new(self.requests()),
        };
        Self {
            name: self.name,
            state: Arc::new(state),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Captured requests, oldest first
    pub fn requests(&self) -> Vec<RequestDescriptor> {
        self.captured().clone()
    }

    pub fn call_count(&self) -> usize {
        self.captured().len()
    }

    pub fn last_request(&self) -> Option<RequestDescriptor> {
        self.captured().last().cloned()
    }

    fn captured(&self) -> MutexGuard<'_, Vec<RequestDescriptor>> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn respond(&self, request: RequestDescriptor) -> Result<Value, TransportError> {
        debug!(transport = %self.name, url = %request.url, "Mock request captured");
        self.captured().push(request);

        if self.state.status >= 400 {
            let detail = (!self.state.body.is_null()).then(|| self.state.body.clone());
            Err(TransportError::Status {
                status: self.state.status,
                detail,
            })
        } else {
            Ok(self.state.body.clone())
        }
    }
}

impl Transport for MockTransport {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, request: RequestDescriptor) -> Result<Value, TransportError> {
        if let Some(delay) = self.state.delay {
            tokio::time::sleep(delay).await;
        }
        self.respond(request)
    }
}

impl LegacyTransport for MockTransport {
    fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the callback before returning
    fn send(&self, request: RequestDescriptor, callback: LegacyCallback) {
        match self.respond(request) {
            Ok(body) => callback(None, Some(body)),
            Err(e) => callback(Some(e.to_string()), None),
        }
    }
}
