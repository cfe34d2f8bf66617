//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace: client
//! configuration, event payloads, the transport-agnostic request descriptor,
//! the error taxonomy and the transport capability traits.
//!
//! Business crates depend on this crate only; it performs no I/O.
//!
//! ## Outcome model
//! - Every dispatch produces exactly one [`Outcome`]
//! - Success carries the parsed JSON response body
//! - Failure carries a [`DispatchError`]

mod config;
mod error;
mod event;
mod request;
mod transport;

pub use config::*;
pub use error::*;
pub use event::*;
pub use request::*;
pub use transport::*;

/// Result of one dispatch: the parsed response body or the failure.
pub type Outcome = Result<serde_json::Value, DispatchError>;
