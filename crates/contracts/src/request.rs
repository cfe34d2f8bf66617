//! RequestDescriptor - Request Builder output
//!
//! Transport-agnostic description of one HTTP call. Built fresh per dispatch.

use serde::Serialize;
use std::time::Duration;

use crate::RetryPolicy;

/// `Content-Type` sent with every event request
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// HTTP method (event ingestion only ever posts)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Post => "POST",
        }
    }
}

/// Request headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestHeaders {
    /// Token derived from the write key
    #[serde(rename = "Authorization")]
    pub authorization: String,
    #[serde(rename = "Content-Type")]
    pub content_type: String,
}

/// Fetch request mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    #[default]
    Cors,
}

/// Redirect handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedirectPolicy {
    #[default]
    Follow,
}

/// Referrer policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferrerPolicy {
    #[default]
    UnsafeUrl,
}

/// Cross-origin metadata, fixed for every request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorsOptions {
    pub mode: RequestMode,
    pub redirect: RedirectPolicy,
    pub referrer_policy: ReferrerPolicy,
}

/// Transport-agnostic request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescriptor {
    pub method: HttpMethod,
    pub url: String,
    pub headers: RequestHeaders,
    /// JSON body, exactly as serialized from the caller's input
    pub body: String,
    #[serde(flatten)]
    pub cors: CorsOptions,
    /// Passed through unmodified for the transport to interpret
    pub retry: Option<RetryPolicy>,
    #[serde(skip)]
    pub timeout: Option<Duration>,
}
