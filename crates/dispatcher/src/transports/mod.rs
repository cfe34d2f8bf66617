//! Transport implementations

mod adapter;
mod fetch;
mod mock;
mod xhr;

pub use adapter::CallbackAdapter;
pub use fetch::FetchTransport;
pub use mock::MockTransport;
#[allow(deprecated)]
pub use xhr::XhrTransport;
