//! Progress notifications emitted by the engine
//!
//! Observers are pure side-effect sinks: the engine never reads anything
//! back from them. The executor calls them from the single task that
//! drains completed work, so calls never overlap.

use crate::engine::report::RoundSummary;

/// Running totals for the current round, passed on every completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoundProgress {
    pub round: u32,
    /// Targets submitted in this round
    pub submitted: usize,
    pub completed: usize,
    pub succeeded: usize,
    /// Permanent plus retryable failures so far in this round
    pub failed: usize,
    /// Retryable failures so far, i.e. the next round's pending set
    pub pending_retry: usize,
}

/// Receiver of engine progress events
pub trait ProgressObserver: Send + Sync {
    /// A round is about to start with `pending` targets
    fn round_started(&self, _round: u32, _max_rounds: u32, _pending: usize) {}

    /// One unit of work completed
    fn target_completed(&self, progress: &RoundProgress);

    /// All workers of the round have drained
    fn round_finished(&self, _summary: &RoundSummary) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn target_completed(&self, _progress: &RoundProgress) {}
}

/// Observer that reports through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn round_started(&self, round: u32, max_rounds: u32, pending: usize) {
        tracing::info!("Round {}/{} starting ({} pending)", round, max_rounds, pending);
    }

    fn target_completed(&self, progress: &RoundProgress) {
        tracing::trace!(
            "Round {}: {}/{} done, ok={} failed={} retry={}",
            progress.round,
            progress.completed,
            progress.submitted,
            progress.succeeded,
            progress.failed,
            progress.pending_retry
        );
    }

    fn round_finished(&self, summary: &RoundSummary) {
        tracing::info!(
            "Round {} finished: {} succeeded, {} permanent, {} to retry ({:?})",
            summary.round,
            summary.succeeded,
            summary.permanent,
            summary.retryable,
            summary.elapsed
        );
    }
}

/// Closures work as completion-only observers
impl<F> ProgressObserver for F
where
    F: Fn(&RoundProgress) + Send + Sync,
{
    fn target_completed(&self, progress: &RoundProgress) {
        self(progress)
    }
}
