//! Run-wide accumulation of outcomes

use crate::engine::outcome::{Outcome, Settled};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Point-in-time view of the aggregator counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregateSnapshot {
    pub processed: usize,
    pub succeeded: usize,
}

/// Thread-safe accumulator for processed/succeeded counts and payloads
///
/// Shared by reference with the round executor. Counters are atomics; the
/// payload list sits behind a mutex. `processed` is bumped last so a reader
/// never sees a processed count that is ahead of its success count.
pub struct Aggregator<P> {
    processed: AtomicUsize,
    succeeded: AtomicUsize,
    payloads: Mutex<Vec<P>>,
}

impl<P> Aggregator<P> {
    pub fn new() -> Self {
        Self {
            processed: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
        }
    }

    /// Records one attempt, keeping the success payload if any
    pub fn record(&self, outcome: Outcome<P>) -> Settled {
        let (settled, payload) = outcome.settle();

        if settled.is_success() {
            if let Some(payload) = payload {
                self.payloads
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push(payload);
            }
            self.succeeded.fetch_add(1, Ordering::AcqRel);
        }
        self.processed.fetch_add(1, Ordering::AcqRel);

        settled
    }

    /// Total attempts recorded across all rounds
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Acquire)
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> AggregateSnapshot {
        let processed = self.processed();
        AggregateSnapshot {
            processed,
            succeeded: self.succeeded(),
        }
    }

    pub fn payload_count(&self) -> usize {
        self.payloads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Consumes the aggregator, yielding payloads in completion order
    pub fn into_payloads(self) -> Vec<P> {
        self.payloads
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<P> Default for Aggregator<P> {
    fn default() -> Self {
        Self::new()
    }
}
