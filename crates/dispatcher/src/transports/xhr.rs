//! XhrTransport - deprecated callback transport
//!
//! Each send opens a fresh blocking request on its own thread and reports
//! through a `(error, body)` callback. Kept for callers that still select
//! `transport_mode = "legacy"`.

#![allow(deprecated)]

use std::thread;

use contracts::{HttpMethod, LegacyCallback, LegacyTransport, RequestDescriptor};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::redirect;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::fetch::is_failure_status;

/// Maximum redirects followed per request
const MAX_REDIRECTS: usize = 10;

/// Callback-based transport
#[deprecated(note = "use FetchTransport; the callback transport will be removed")]
#[derive(Debug, Clone)]
pub struct XhrTransport {
    name: String,
}

impl XhrTransport {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    // Runs on the request thread; the blocking client must not live on an
    // async runtime thread
    fn execute(request: &RequestDescriptor) -> Result<Value, String> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .referer(true)
            .timeout(request.timeout)
            .build()
            .map_err(|e| format!("failed to open request: {e}"))?;

        let method = match request.method {
            HttpMethod::Post => reqwest::Method::POST,
        };

        let response = client
            .request(method, &request.url)
            .header(AUTHORIZATION, &request.headers.authorization)
            .header(CONTENT_TYPE, &request.headers.content_type)
            .body(request.body.clone())
            .send()
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let text = response.text().map_err(|e| e.to_string())?;

        if is_failure_status(status) {
            let text = text.trim();
            return Err(if text.is_empty() {
                format!("HTTP {}", status.as_u16())
            } else {
                format!("HTTP {}: {text}", status.as_u16())
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| format!("invalid response body: {e}"))
    }
}

impl LegacyTransport for XhrTransport {
    fn name(&self) -> &str {
        &self.name
    }

    fn send(&self, request: RequestDescriptor, callback: LegacyCallback) {
        debug!(transport = %self.name, url = %request.url, "Dispatching legacy request");

        let spawned = thread::Builder::new()
            .name(format!("{}-request", self.name))
            .spawn(move || match Self::execute(&request) {
                Ok(body) => callback(None, Some(body)),
                Err(message) => {
                    warn!(url = %request.url, error = %message, "Legacy request failed");
                    callback(Some(message), None);
                }
            });

        // A failed spawn drops the callback with the closure
        if let Err(e) = spawned {
            error!(transport = %self.name, error = %e, "Failed to spawn legacy request thread");
        }
    }
}
