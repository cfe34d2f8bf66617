//! # Dispatcher
//!
//! Event dispatch engine.
//!
//! Responsible for:
//! - the kill-switch gate shared across clients
//! - payload validation and request building
//! - sending through the selected transport
//! - delivering each outcome to the awaitable result and the optional callback

pub mod client;
pub mod completion;
pub mod dispatcher;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod request;
pub mod transports;
pub mod validator;

pub use client::{EventClient, SelectedTransport};
pub use completion::DispatchFuture;
pub use contracts::{
    BatchEventRequest, ClientConfig, DispatchError, EventCallback, Outcome, Protocol,
    RequestDescriptor, RetryPolicy, Transport, TransportError, TransportMode,
};
pub use dispatcher::{DispatchKind, Dispatcher};
pub use error::ClientError;
pub use gate::{is_enabled, set_enabled, Gate};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use request::RequestBuilder;
#[allow(deprecated)]
pub use transports::{CallbackAdapter, FetchTransport, MockTransport, XhrTransport};
