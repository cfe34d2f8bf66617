//! Dual completion
//!
//! One [`Completion`] per dispatch. The outcome is delivered exactly once: to
//! the optional callback and to the [`DispatchFuture`] returned to the caller,
//! always agreeing. A completion dropped without `complete` (panicking
//! transport, runtime shutdown) delivers an internal error to both.

use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};

use contracts::{DispatchError, EventCallback, Outcome};
use tokio::sync::oneshot;
use tracing::{error, warn};

/// Create the completion side and the future side of one dispatch
pub fn channel(callback: Option<EventCallback>) -> (Completion, DispatchFuture) {
    let (tx, rx) = oneshot::channel();
    (
        Completion {
            tx: Some(tx),
            callback,
        },
        DispatchFuture { rx },
    )
}

/// Completion handle for one dispatch
pub struct Completion {
    // `None` once delivered
    tx: Option<oneshot::Sender<Outcome>>,
    callback: Option<EventCallback>,
}

impl Completion {
    /// Deliver the outcome through every active channel
    ///
    /// The callback runs first, so an awaiting caller observes it as done.
    /// A panicking callback is contained and logged; the future still
    /// resolves with the same outcome.
    pub fn complete(mut self, outcome: Outcome) {
        self.deliver(outcome);
    }

    /// Whether a callback is attached
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }

    fn deliver(&mut self, outcome: Outcome) {
        let Some(tx) = self.tx.take() else {
            return;
        };

        if let Some(callback) = self.callback.take() {
            let (err, body) = match &outcome {
                Ok(body) => (None, Some(body.clone())),
                Err(e) => (Some(e.clone()), None),
            };
            if catch_unwind(AssertUnwindSafe(|| callback(err, body))).is_err() {
                error!("Completion callback panicked");
            }
        }

        // Receiver may be gone when the caller dropped the future
        let _ = tx.send(outcome);
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if self.tx.is_some() {
            warn!("Dispatch ended without an outcome");
            self.deliver(Err(dropped()));
        }
    }
}

/// Awaitable result of a dispatch
///
/// The dispatch runs whether or not this is awaited; dropping it does not
/// cancel the request.
#[derive(Debug)]
pub struct DispatchFuture {
    rx: oneshot::Receiver<Outcome>,
}

impl DispatchFuture {
    /// Outcome if already delivered, without waiting
    pub fn try_outcome(&mut self) -> Option<Outcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(dropped())),
        }
    }
}

impl Future for DispatchFuture {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(dropped())))
    }
}

fn dropped() -> DispatchError {
    DispatchError::internal("dispatch ended without delivering an outcome")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    type Calls = Arc<Mutex<Vec<(Option<String>, Option<Value>)>>>;

    fn recording_callback() -> (EventCallback, Calls) {
        let calls: Calls = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&calls);
        let callback: EventCallback = Box::new(move |err, body| {
            sink.lock()
                .unwrap()
                .push((err.map(|e| e.to_string()), body));
        });
        (callback, calls)
    }

    #[tokio::test]
    async fn test_success_reaches_both_channels() {
        let (callback, calls) = recording_callback();
        let (completion, future) = channel(Some(callback));

        completion.complete(Ok(json!({"created": true})));

        assert_eq!(future.await.unwrap(), json!({"created": true}));
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (None, Some(json!({"created": true}))));
    }

    #[tokio::test]
    async fn test_failure_reaches_both_channels() {
        let (callback, calls) = recording_callback();
        let (completion, future) = channel(Some(callback));

        completion.complete(Err(DispatchError::validation("bad")));

        assert!(matches!(
            future.await,
            Err(DispatchError::Validation { .. })
        ));
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.is_some());
        assert!(calls[0].1.is_none());
    }

    #[tokio::test]
    async fn test_without_callback() {
        let (completion, mut future) = channel(None);
        assert!(!completion.has_callback());
        assert!(future.try_outcome().is_none());

        completion.complete(Ok(Value::Null));
        assert_eq!(future.try_outcome().unwrap().unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_dropped_completion_resolves_future() {
        let (completion, future) = channel(None);
        drop(completion);
        assert!(matches!(future.await, Err(DispatchError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_dropped_completion_still_invokes_callback() {
        let (callback, calls) = recording_callback();
        let (completion, future) = channel(Some(callback));
        drop(completion);

        assert!(matches!(future.await, Err(DispatchError::Internal { .. })));
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].0.is_some());
        assert!(calls[0].1.is_none());
    }

    #[test]
    fn test_completed_then_dropped_delivers_once() {
        let (callback, calls) = recording_callback();
        let (completion, _future) = channel(Some(callback));

        completion.complete(Ok(Value::Null));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_panicking_callback_still_resolves_future() {
        let callback: EventCallback = Box::new(|_, _| panic!("callback bug"));
        let (completion, future) = channel(Some(callback));

        completion.complete(Ok(json!({"created": true})));
        assert!(future.await.is_ok());
    }

    #[test]
    fn test_dropped_future_does_not_block_completion() {
        let (callback, calls) = recording_callback();
        let (completion, future) = channel(Some(callback));
        drop(future);

        completion.complete(Ok(Value::Null));
        assert_eq!(calls.lock().unwrap().len(), 1);
    }
}
