//! # Integration Tests
//!
//! Cross-crate end-to-end tests.
//!
//! Covers:
//! - contract snapshots (wire shapes, error display)
//! - dispatch against a local HTTP server, both transports
//! - config file to client to request

#[cfg(test)]
mod support {
    use std::sync::{Arc, Mutex};

    use contracts::{ClientConfig, DispatchError, EventCallback, Protocol};
    use serde_json::Value;
    use wiremock::MockServer;

    pub const PROJECT_ID: &str = "5011efa95f546f2ce2000000";
    pub const WRITE_KEY: &str = "bad71ffe8407322ab70559afef29508799ed64b3f75a1ba9e26";

    pub type Calls = Arc<Mutex<Vec<(Option<DispatchError>, Option<Value>)>>>;

    pub fn config_for(server: &MockServer) -> ClientConfig {
        let host = server.uri().trim_start_matches("http://").to_string();
        ClientConfig::new(PROJECT_ID, WRITE_KEY, host, Protocol::Http)
    }

    pub fn events_path(collection: Option<&str>) -> String {
        match collection {
            Some(c) => format!("/3.0/projects/{PROJECT_ID}/events/{c}"),
            None => format!("/3.0/projects/{PROJECT_ID}/events"),
        }
    }

    pub fn recording_callback() -> (EventCallback, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let callback: EventCallback = Box::new(move |err, body| {
            sink.lock().unwrap().push((err, body));
        });
        (callback, calls)
    }

    /// The single recorded callback invocation
    pub fn only_call(calls: &Calls) -> (Option<DispatchError>, Option<Value>) {
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1, "callback must fire exactly once");
        calls[0].clone()
    }
}

#[cfg(test)]
mod contract_tests {
    use contracts::{DispatchError, TransportError, TransportMode};
    use serde_json::json;

    #[test]
    #[allow(deprecated)]
    fn test_transport_mode_names() {
        let mode: TransportMode = serde_json::from_value(json!("fetch")).unwrap();
        assert_eq!(mode, TransportMode::Default);
        let mode: TransportMode = serde_json::from_value(json!("xhr")).unwrap();
        assert_eq!(mode, TransportMode::Legacy);
    }

    #[test]
    fn test_short_circuit_errors_have_messages() {
        for err in [
            DispatchError::disabled("event dispatch is disabled"),
            DispatchError::validation("missing event collection name"),
        ] {
            assert!(err.is_short_circuit());
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn test_status_error_carries_detail() {
        let err = DispatchError::from(TransportError::Status {
            status: 400,
            detail: Some(json!({"message": "bad"})),
        });
        assert_eq!(err.status(), Some(400));
        assert!(err.to_string().contains("400"));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use contracts::{DispatchError, TransportMode};
    use dispatcher::{EventClient, Gate};
    use serde_json::{json, Value};
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::support::*;

    async fn server_responding(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    fn client(server: &MockServer) -> EventClient {
        EventClient::with_gate(config_for(server), Gate::new()).unwrap()
    }

    #[allow(deprecated)]
    fn legacy_client(server: &MockServer) -> EventClient {
        let config = config_for(server).with_transport_mode(TransportMode::Legacy);
        EventClient::with_gate(config, Gate::new()).unwrap()
    }

    /// Single event: exact URL, headers and body on the wire
    #[tokio::test]
    async fn test_single_event_wire_format() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(events_path(Some("purchases_succeed"))))
            .and(header("Authorization", WRITE_KEY))
            .and(header("Content-Type", "application/json"))
            .and(body_string(r#"{"username":"keenio","color":"blue","n":1}"#))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"created":true}"#))
            .expect(1)
            .mount(&server)
            .await;

        let body = client(&server)
            .record_event(
                "purchases_succeed",
                json!({"username": "keenio", "color": "blue", "n": 1}),
                None,
            )
            .await
            .unwrap();

        assert_eq!(body, json!({"created": true}));
    }

    /// Batch: body is the whole mapping, in caller order
    #[tokio::test]
    async fn test_batch_wire_format() {
        let server = MockServer::start().await;
        let response = r#"{"pageview":[{"success":true},{"success":true}],"click":[{"success":true}]}"#;
        Mock::given(method("POST"))
            .and(path(events_path(None)))
            .and(body_string(
                r#"{"pageview":[{"page":"this one"},{"page":"same!"}],"click":[{"page":"tada!"}]}"#,
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(response))
            .expect(1)
            .mount(&server)
            .await;

        let batch: Value = serde_json::from_str(
            r#"{"pageview":[{"page":"this one"},{"page":"same!"}],"click":[{"page":"tada!"}]}"#,
        )
        .unwrap();

        let (callback, calls) = recording_callback();
        let body = client(&server)
            .record_events(batch, Some(callback))
            .await
            .unwrap();

        assert_eq!(body["click"][0]["success"], true);
        let (err, delivered) = only_call(&calls);
        assert!(err.is_none());
        assert_eq!(delivered, Some(body));
    }

    #[tokio::test]
    async fn test_disabled_gate_makes_no_network_call() {
        let server = server_responding(200, r#"{"created":true}"#).await;
        let client = client(&server);
        client.gate().disable();

        let (callback, calls) = recording_callback();
        let outcome = client
            .record_event("purchases", json!({"test": "data"}), Some(callback))
            .await;

        assert!(matches!(outcome, Err(DispatchError::Disabled { .. })));
        let (err, body) = only_call(&calls);
        assert!(!err.unwrap().to_string().is_empty());
        assert!(body.is_none());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    /// The process-wide switch reaches clients built with the default constructor
    #[tokio::test]
    async fn test_global_switch_affects_default_clients() {
        let server = server_responding(200, r#"{"created":true}"#).await;
        let client = EventClient::new(config_for(&server)).unwrap();

        dispatcher::set_enabled(false);
        let outcome = client.record_events(json!({"pageview": [{}]}), None).await;
        dispatcher::set_enabled(true);

        assert!(matches!(outcome, Err(DispatchError::Disabled { .. })));
        assert!(dispatcher::is_enabled());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_collection_makes_no_network_call() {
        let server = server_responding(200, r#"{"created":true}"#).await;
        let (callback, calls) = recording_callback();

        let outcome = client(&server)
            .record_event("", json!({"test": "data"}), Some(callback))
            .await;

        assert!(matches!(outcome, Err(DispatchError::Validation { .. })));
        let (err, body) = only_call(&calls);
        assert!(matches!(err, Some(DispatchError::Validation { .. })));
        assert!(body.is_none());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_array_and_empty_string_batches_rejected() {
        let server = server_responding(200, r#"{"created":true}"#).await;
        let client = client(&server);

        for batch in [json!([]), json!("")] {
            let (callback, calls) = recording_callback();
            let outcome = client.record_events(batch, Some(callback)).await;

            assert!(outcome.is_err());
            let (err, body) = only_call(&calls);
            assert!(!err.unwrap().to_string().is_empty());
            assert!(body.is_none());
        }

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_http_400_rejects_both_calls() {
        let server = server_responding(400, r#"{"error_code":"InvalidEventError"}"#).await;
        let client = client(&server);

        let single = client.record_event("purchases", json!({"a": 1}), None).await;
        let batch = client
            .record_events(json!({"pageview": [{"a": 1}]}), None)
            .await;

        for outcome in [single, batch] {
            let err = outcome.unwrap_err();
            assert_eq!(err.status(), Some(400));
        }
        assert_eq!(client.metrics().failed, 2);
    }

    #[tokio::test]
    async fn test_legacy_transport_calls_back_with_body() {
        let server = server_responding(200, r#"{"created":true}"#).await;
        let client = legacy_client(&server);
        let (callback, calls) = recording_callback();

        let body = client
            .record_event("purchases", json!({"test": "data"}), Some(callback))
            .await
            .unwrap();

        assert_eq!(body, json!({"created": true}));
        let (err, delivered) = only_call(&calls);
        assert!(err.is_none());
        assert_eq!(delivered, Some(json!({"created": true})));
    }

    #[tokio::test]
    async fn test_legacy_transport_rejects_http_400() {
        let server = server_responding(400, r#"{"error_code":"InvalidEventError"}"#).await;
        let client = legacy_client(&server);
        let (callback, calls) = recording_callback();

        let outcome = client
            .record_events(json!({"pageview": [{"a": 1}]}), Some(callback))
            .await;

        let err = outcome.unwrap_err();
        assert_eq!(err.kind(), "legacy");
        assert!(err.to_string().contains("400"));
        let (cb_err, body) = only_call(&calls);
        assert!(cb_err.is_some());
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_repeated_calls_send_identical_requests() {
        let server = server_responding(200, r#"{"created":true}"#).await;
        let client = client(&server);

        let first = client.record_event("purchases", json!({"test": "data"}), None);
        let second = client.record_event("purchases", json!({"test": "data"}), None);
        assert!(first.await.is_ok());
        assert!(second.await.is_ok());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, requests[1].url);
        assert_eq!(requests[0].body, requests[1].body);
        assert_eq!(
            requests[0].headers.get("authorization"),
            requests[1].headers.get("authorization")
        );
    }

    #[tokio::test]
    async fn test_timeout_resolves_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"created":true}"#)
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let config = config_for(&server).with_timeout(Duration::from_millis(50));
        let client = EventClient::with_gate(config, Gate::new()).unwrap();
        let (callback, calls) = recording_callback();

        let err = client
            .record_event("purchases", json!({}), Some(callback))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "timeout");
        assert!(only_call(&calls).0.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_dispatches_are_independent() {
        let server = server_responding(200, r#"{"created":true}"#).await;
        let client = client(&server);

        let futures: Vec<_> = (0..8)
            .map(|i| client.record_event("purchases", json!({"i": i}), None))
            .collect();
        for future in futures {
            assert!(future.await.is_ok());
        }

        let snapshot = client.metrics();
        assert_eq!(snapshot.succeeded, 8);
        assert_eq!(snapshot.in_flight, 0);
    }
}

#[cfg(test)]
mod config_e2e_tests {
    use std::io::Write;

    use config_loader::ConfigLoader;
    use dispatcher::{EventClient, Gate, RequestBuilder};
    use tempfile::NamedTempFile;

    #[test]
    fn test_toml_file_to_request_url() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
project_id = "proj"
write_key = "key"
host = "localhost:9000"
protocol = "http"
transport_mode = "fetch"
timeout_ms = 2000

[retry]
max_attempts = 2
"#
        )
        .unwrap();

        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        let builder = RequestBuilder::new(&config).unwrap();
        assert_eq!(
            builder.events_url(Some("signups")).as_str(),
            "http://localhost:9000/3.0/projects/proj/events/signups"
        );

        let client = EventClient::with_gate(config, Gate::new()).unwrap();
        assert_eq!(client.transport_name(), "fetch");
        assert_eq!(client.config().retry.map(|r| r.base_backoff_ms), Some(200));
    }

    #[test]
    fn test_missing_write_key_fails_construction() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        write!(
            file,
            r#"{{"project_id":"proj","write_key":"","host":"api.keen.io","protocol":"https"}}"#
        )
        .unwrap();

        assert!(EventClient::from_path(file.path()).is_err());
    }
}
