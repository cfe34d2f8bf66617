//! Request Builder
//!
//! Turns validated payloads plus client credentials into a
//! [`RequestDescriptor`]. Output depends only on the config and the payload.

use std::time::Duration;

use contracts::{
    BatchEventRequest, ClientConfig, ConfigError, CorsOptions, DispatchError, HttpMethod,
    RequestDescriptor, RequestHeaders, RetryPolicy, SingleEventRequest, API_VERSION,
    CONTENT_TYPE_JSON,
};
use serde::Serialize;
use tracing::{debug, instrument};
use url::Url;

/// Builds request descriptors for one client
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    /// `{protocol}://{host}/3.0/projects/{project_id}/events`
    events_url: Url,
    authorization: String,
    retry: Option<RetryPolicy>,
    timeout: Option<Duration>,
}

impl RequestBuilder {
    /// Prepare a builder from client configuration
    ///
    /// # Errors
    /// Fails when `protocol://host` is not a valid base URL.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let base = format!("{}/", config.base_url());
        let mut events_url = Url::parse(&base).map_err(|e| {
            ConfigError::validation("host", format!("'{}' is not a valid host: {e}", config.host))
        })?;

        events_url
            .path_segments_mut()
            .map_err(|()| ConfigError::validation("host", "host cannot be used as a base URL"))?
            .pop_if_empty()
            .extend([API_VERSION, "projects", config.project_id.as_str(), "events"]);

        Ok(Self {
            events_url,
            authorization: config.write_key.auth_token(),
            retry: config.retry,
            timeout: config.timeout(),
        })
    }

    /// URL for the batch endpoint, or a single collection
    pub fn events_url(&self, collection: Option<&str>) -> Url {
        let mut url = self.events_url.clone();
        if let Some(collection) = collection {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.push(collection);
            }
        }
        url
    }

    /// Descriptor for a single event: body is the properties
    #[instrument(name = "request_build_single", skip(self, request), fields(collection = %request.collection))]
    pub fn build_single(
        &self,
        request: &SingleEventRequest,
    ) -> Result<RequestDescriptor, DispatchError> {
        let url = self.events_url(Some(&request.collection));
        self.build(url, &request.properties)
    }

    /// Descriptor for a batch: body is the whole mapping
    #[instrument(name = "request_build_batch", skip(self, request), fields(collections = request.len()))]
    pub fn build_batch(
        &self,
        request: &BatchEventRequest,
    ) -> Result<RequestDescriptor, DispatchError> {
        let url = self.events_url(None);
        self.build(url, request)
    }

    fn build<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<RequestDescriptor, DispatchError> {
        let body = serde_json::to_string(body)
            .map_err(|e| DispatchError::internal(format!("failed to serialize body: {e}")))?;

        debug!(url = %url, bytes = body.len(), "Request built");

        Ok(RequestDescriptor {
            method: HttpMethod::Post,
            url: url.into(),
            headers: RequestHeaders {
                authorization: self.authorization.clone(),
                content_type: CONTENT_TYPE_JSON.to_string(),
            },
            body,
            cors: CorsOptions::default(),
            retry: self.retry,
            timeout: self.timeout,
        })
    }
}
