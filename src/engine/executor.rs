//! Round executor: one operation over one batch with a bounded worker pool
//!
//! Work is driven through `buffer_unordered`, so at most
//! `concurrency_limit` operations are in flight and the next target starts
//! as soon as any slot frees. Completions are consumed on the calling task
//! in completion order; aggregator updates and observer calls happen there,
//! one at a time.

use crate::engine::aggregator::Aggregator;
use crate::engine::observer::{ProgressObserver, RoundProgress};
use crate::engine::operation::Operation;
use crate::engine::outcome::{FailureReason, Outcome, OutcomeKind, Settled, Target};
use crate::engine::report::RoundSummary;
use crate::engine::EngineConfig;
use futures::stream::{self, StreamExt};
use std::time::Instant;

/// Result of one round, in completion order
#[derive(Debug)]
pub struct RoundResult {
    pub summary: RoundSummary,
    pub settled: Vec<Settled>,
}

/// Runs `operation` once for every target in `targets`
///
/// Duplicated targets are executed once per occurrence. An operation that
/// exceeds `config.operation_timeout` is settled as a retryable timeout.
pub async fn run_round<O: Operation>(
    round: u32,
    targets: &[Target],
    operation: &O,
    client: &O::Client,
    config: &EngineConfig,
    aggregator: &Aggregator<O::Payload>,
    observer: &dyn ProgressObserver,
) -> RoundResult {
    let started = Instant::now();
    let timeout = config.operation_timeout;

    let mut progress = RoundProgress {
        round,
        submitted: targets.len(),
        ..Default::default()
    };
    let mut settled = Vec::with_capacity(targets.len());

    let mut in_flight = stream::iter(targets.iter().cloned())
        .map(|target| async move {
            let result = tokio::time::timeout(timeout, operation.execute(&target, client)).await;
            match result {
                Ok(outcome) => outcome,
                Err(_) => Outcome::retryable(target, FailureReason::Timeout),
            }
        })
        .buffer_unordered(config.concurrency_limit.max(1));

    while let Some(outcome) = in_flight.next().await {
        log_outcome(round, &outcome);

        let outcome = aggregator.record(outcome);
        progress.completed += 1;
        match outcome.kind() {
            OutcomeKind::Success => progress.succeeded += 1,
            OutcomeKind::Retryable => {
                progress.failed += 1;
                progress.pending_retry += 1;
            }
            OutcomeKind::Permanent => progress.failed += 1,
        }

        observer.target_completed(&progress);
        settled.push(outcome);
    }

    RoundResult {
        summary: RoundSummary {
            round,
            submitted: progress.submitted,
            succeeded: progress.succeeded,
            permanent: progress.failed - progress.pending_retry,
            retryable: progress.pending_retry,
            elapsed: started.elapsed(),
        },
        settled,
    }
}

fn log_outcome<P>(round: u32, outcome: &Outcome<P>) {
    match outcome {
        Outcome::Success { target, .. } => {
            tracing::debug!("[round {}] {} succeeded", round, target);
        }
        Outcome::RetryableFailure { target, reason } => {
            tracing::warn!("[round {}] {} will be retried: {}", round, target, reason);
        }
        Outcome::PermanentFailure { target, reason } => {
            tracing::debug!("[round {}] {} failed permanently: {}", round, target, reason);
        }
    }
}
