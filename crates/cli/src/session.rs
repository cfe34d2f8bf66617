//! Dispatch session: runs calls through a client and keeps statistics.

use std::time::Instant;

use dispatcher::{DispatchError, DispatchFuture, EventClient, Outcome};
use observability::DispatchStatsAggregator;
use serde_json::Value;
use tracing::{info, warn};

/// One CLI invocation's worth of dispatches
#[derive(Debug)]
pub struct Session {
    client: EventClient,
    stats: DispatchStatsAggregator,
}

impl Session {
    pub fn new(client: EventClient) -> Self {
        Self {
            client,
            stats: DispatchStatsAggregator::new(),
        }
    }

    pub fn client(&self) -> &EventClient {
        &self.client
    }

    pub async fn record_event(&mut self, collection: &str, properties: Value) -> Outcome {
        let future = self.client.record_event(collection, properties, None);
        self.track(future).await
    }

    pub async fn record_events(&mut self, batch: Value) -> Outcome {
        let future = self.client.record_events(batch, None);
        self.track(future).await
    }

    async fn track(&mut self, future: DispatchFuture) -> Outcome {
        let started = Instant::now();
        let outcome = future.await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match &outcome {
            Ok(_) => {
                info!(elapsed_ms, "Event recorded");
                self.stats.record_success(elapsed_ms);
            }
            Err(e) => {
                warn!(error = %e, kind = e.kind(), "Event not recorded");
                let latency = (!e.is_short_circuit()).then_some(elapsed_ms);
                self.stats.record_failure(e.kind(), latency);
            }
        }

        outcome
    }

    pub fn print_summary(&self) {
        let snapshot = self.client.metrics();
        println!();
        print!("{}", self.stats.summary());
        println!(
            "Client counters: dispatched={} succeeded={} failed={} short_circuited={}",
            snapshot.dispatched, snapshot.succeeded, snapshot.failed, snapshot.short_circuited
        );
    }
}

/// Print an outcome the way the user expects to read it
pub fn print_outcome(outcome: &Outcome) -> Result<(), DispatchError> {
    match outcome {
        Ok(body) => {
            let rendered =
                serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
            println!("✓ Event recorded");
            println!("{rendered}");
            Ok(())
        }
        Err(e) => {
            println!("✗ {e}");
            if let DispatchError::Transport(contracts::TransportError::Status {
                detail: Some(detail),
                ..
            }) = e
            {
                println!("  Server said: {detail}");
            }
            Err(e.clone())
        }
    }
}
