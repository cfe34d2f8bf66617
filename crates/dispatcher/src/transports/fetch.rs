//! FetchTransport - async HTTP via reqwest

use std::time::Instant;

use contracts::{HttpMethod, RequestDescriptor, Transport, TransportError};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{redirect, Client, Method, Response};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::ClientError;

/// Maximum redirects followed per request
const MAX_REDIRECTS: usize = 10;

/// Default transport: async HTTP
///
/// Applies the descriptor's retry policy: server errors and timeout/connect
/// failures are retried with exponential backoff.
#[derive(Debug, Clone)]
pub struct FetchTransport {
    name: String,
    client: Client,
}

impl FetchTransport {
    /// Create a new FetchTransport
    pub fn new(name: impl Into<String>) -> Result<Self, ClientError> {
        let name = name.into();
        let client = Client::builder()
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .referer(true)
            .build()
            .map_err(|e| ClientError::transport_creation(&name, e.to_string()))?;

        Ok(Self { name, client })
    }

    fn prepare(&self, request: &RequestDescriptor) -> reqwest::RequestBuilder {
        let method = match request.method {
            HttpMethod::Post => Method::POST,
        };

        let mut builder = self
            .client
            .request(method, &request.url)
            .header(AUTHORIZATION, &request.headers.authorization)
            .header(CONTENT_TYPE, &request.headers.content_type)
            .body(request.body.clone());

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder
    }

    async fn read_response(&self, response: Response) -> Result<Value, TransportError> {
        let status = response.status();
        let text = response.text().await.map_err(classify_error)?;

        if is_failure_status(status) {
            return Err(TransportError::Status {
                status: status.as_u16(),
                detail: serde_json::from_str(&text).ok(),
            });
        }

        parse_success_body(&text)
    }
}

impl Transport for FetchTransport {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "fetch_transport_send",
        skip(self, request),
        fields(transport = %self.name, url = %request.url)
    )]
    async fn send(&self, request: RequestDescriptor) -> Result<Value, TransportError> {
        let policy = request.retry;
        let attempts = policy.map_or(1, |p| p.attempts());

        for attempt in 1..=attempts {
            let started = Instant::now();
            debug!(attempt, "Sending event request");

            match self.prepare(&request).send().await {
                Ok(response) => {
                    let status = response.status();
                    debug!(
                        attempt,
                        status = status.as_u16(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Received response"
                    );

                    if status.is_server_error() && attempt < attempts {
                        if let Some(policy) = policy {
                            warn!(attempt, status = status.as_u16(), "Server error, retrying");
                            tokio::time::sleep(policy.backoff(attempt)).await;
                            continue;
                        }
                    }

                    return self.read_response(response).await;
                }
                Err(err) => {
                    debug!(attempt, error = %err, "Request failed");

                    if should_retry_error(&err) && attempt < attempts {
                        if let Some(policy) = policy {
                            warn!(attempt, error = %err, "Transport error, retrying");
                            tokio::time::sleep(policy.backoff(attempt)).await;
                            continue;
                        }
                    }

                    return Err(classify_error(err));
                }
            }
        }

        Err(TransportError::network(
            "retries exhausted without producing a response",
        ))
    }
}

/// Parse a 2xx body; an empty body is `null`
pub(crate) fn parse_success_body(text: &str) -> Result<Value, TransportError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| TransportError::decode(e.to_string()))
}

/// Any status from 400 up is a failure, including non-standard codes
pub(crate) fn is_failure_status(status: reqwest::StatusCode) -> bool {
    status.as_u16() >= 400
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

fn classify_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        TransportError::decode(err.to_string())
    } else {
        TransportError::network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CorsOptions, RequestHeaders, RetryPolicy, CONTENT_TYPE_JSON};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn descriptor(url: String, body: &str) -> RequestDescriptor {
        RequestDescriptor {
            method: HttpMethod::Post,
            url,
            headers: RequestHeaders {
                authorization: "write-key".to_string(),
                content_type: CONTENT_TYPE_JSON.to_string(),
            },
            body: body.to_string(),
            cors: CorsOptions::default(),
            retry: None,
            timeout: None,
        }
    }

    #[tokio::test]
    async fn test_posts_body_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/3.0/projects/p/events/purchases"))
            .and(header("Authorization", "write-key"))
            .and(header("Content-Type", "application/json"))
            .and(body_string(r#"{"test":"data"}"#))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"created":true}"#))
            .expect(1)
            .mount(&server)
            .await;

        let transport = FetchTransport::new("fetch").unwrap();
        let url = format!("{}/3.0/projects/p/events/purchases", server.uri());
        let body = transport
            .send(descriptor(url, r#"{"test":"data"}"#))
            .await
            .unwrap();

        assert_eq!(body, json!({"created": true}));
    }

    #[tokio::test]
    async fn test_client_error_carries_status_and_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error_code":"InvalidEventError"}"#),
            )
            .mount(&server)
            .await;

        let transport = FetchTransport::new("fetch").unwrap();
        let err = transport
            .send(descriptor(server.uri(), "{}"))
            .await
            .unwrap_err();

        match err {
            TransportError::Status { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail, Some(json!({"error_code": "InvalidEventError"})));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_without_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
            .mount(&server)
            .await;

        let transport = FetchTransport::new("fetch").unwrap();
        let err = transport
            .send(descriptor(server.uri(), "{}"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            TransportError::Status {
                status: 404,
                detail: None
            }
        ));
    }

    #[tokio::test]
    async fn test_success_with_non_json_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let transport = FetchTransport::new("fetch").unwrap();
        let err = transport
            .send(descriptor(server.uri(), "{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_no_retry_without_policy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let transport = FetchTransport::new("fetch").unwrap();
        let err = transport
            .send(descriptor(server.uri(), "{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_retries_server_errors_with_policy() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"created":true}"#))
            .mount(&server)
            .await;

        let transport = FetchTransport::new("fetch").unwrap();
        let mut request = descriptor(server.uri(), "{}");
        request.retry = Some(RetryPolicy {
            max_attempts: 3,
            base_backoff_ms: 5,
        });

        let body = transport.send(request).await.unwrap();
        assert_eq!(body, json!({"created": true}));
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let transport = FetchTransport::new("fetch").unwrap();
        let mut request = descriptor(server.uri(), "{}");
        request.retry = Some(RetryPolicy {
            max_attempts: 3,
            base_backoff_ms: 5,
        });

        assert!(transport.send(request).await.is_err());
    }

    #[tokio::test]
    async fn test_timeout_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let transport = FetchTransport::new("fetch").unwrap();
        let mut request = descriptor(server.uri(), "{}");
        request.timeout = Some(Duration::from_millis(50));

        let err = transport.send(request).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let transport = FetchTransport::new("fetch").unwrap();
        let err = transport
            .send(descriptor("http://127.0.0.1:9/events".to_string(), "{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Network { .. }));
    }

    #[tokio::test]
    async fn test_failure_boundary_at_400() {
        let server = MockServer::start().await;
        for status in [399u16, 400, 600] {
            Mock::given(method("POST"))
                .and(path(format!("/{status}")))
                .respond_with(ResponseTemplate::new(status).set_body_string(r#"{"error":true}"#))
                .mount(&server)
                .await;
        }

        let transport = FetchTransport::new("fetch").unwrap();
        let url = |status: u16| format!("{}/{status}", server.uri());

        let below = transport.send(descriptor(url(399), "{}")).await;
        assert_eq!(below.unwrap(), json!({"error": true}));
        assert!(matches!(
            transport.send(descriptor(url(400), "{}")).await,
            Err(TransportError::Status { status: 400, .. })
        ));
        match transport.send(descriptor(url(600), "{}")).await.unwrap_err() {
            TransportError::Status { status, detail } => {
                assert_eq!(status, 600);
                assert_eq!(detail, Some(json!({"error": true})));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_success_body_is_null() {
        assert_eq!(parse_success_body("").unwrap(), Value::Null);
        assert_eq!(parse_success_body(" {\"a\":1} ").unwrap(), json!({"a": 1}));
    }
}
