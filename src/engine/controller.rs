//! Round controller: drives successive rounds until the pending set drains
//! or the round ceiling is reached
//!
//! # State machine
//!
//! ```text
//! Idle -> RoundRunning(1) -> RoundEvaluating(1) -> RoundRunning(2) -> ...
//!                                   |
//!                                   +-> Drained    (nothing left to retry)
//!                                   +-> Exhausted  (ceiling hit, targets pending)
//!                                   +-> Cancelled  (token fired between rounds)
//! ```
//!
//! Round `n + 1` runs exactly the retryable targets of round `n`. A cooldown
//! separates rounds; cancellation is only observed between rounds, never
//! inside one.

use crate::engine::aggregator::Aggregator;
use crate::engine::executor::{run_round, RoundResult};
use crate::engine::observer::{NoopObserver, ProgressObserver};
use crate::engine::operation::Operation;
use crate::engine::outcome::{Outcome, Target};
use crate::engine::report::{FailedTarget, RoundSummary, RunOutput, RunReport, Termination};
use crate::engine::EngineConfig;
use crate::SweepError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Controller states
#[derive(Debug)]
enum ControllerState {
    Idle,
    RoundRunning(u32),
    RoundEvaluating(u32, RoundResult),
    Drained,
    Exhausted,
    Cancelled,
}

/// Multi-round driver owning the target list, operation, client and config
pub struct RoundController<O: Operation> {
    targets: Vec<Target>,
    operation: O,
    client: O::Client,
    config: EngineConfig,
    observer: Arc<dyn ProgressObserver>,
    cancel: CancellationToken,
}

impl<O: Operation> RoundController<O> {
    /// Creates a controller, rejecting runs that could not start
    ///
    /// # Errors
    ///
    /// * `SweepError::EmptyTargets` - the target list is empty
    /// * `SweepError::InvalidEngineConfig` - zero workers or zero rounds
    pub fn new(
        targets: Vec<Target>,
        operation: O,
        client: O::Client,
        config: EngineConfig,
    ) -> Result<Self, SweepError> {
        if targets.is_empty() {
            return Err(SweepError::EmptyTargets);
        }
        config.validate()?;

        Ok(Self {
            targets,
            operation,
            client,
            config,
            observer: Arc::new(NoopObserver),
            cancel: CancellationToken::new(),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Token checked between rounds and during cooldowns
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs rounds to a terminal state and builds the report
    ///
    /// Never fails: a run in which every target fails still yields a report.
    pub async fn run(self) -> RunOutput<O::Payload> {
        let started_at = Utc::now();
        let started = Instant::now();
        let operation_name = self.operation.name();
        let max_rounds = self.config.max_rounds;
        let total_initial = self.targets.len();

        let aggregator: Aggregator<O::Payload> = Aggregator::new();
        let mut pending: Vec<Target> = self.targets.clone();
        let mut carried: Vec<FailedTarget> = Vec::new();
        let mut failed: Vec<FailedTarget> = Vec::new();
        let mut rounds: Vec<RoundSummary> = Vec::new();
        let mut cooldowns = 0u32;

        tracing::info!(
            "Starting {} run: {} targets, {} workers, up to {} rounds",
            operation_name,
            total_initial,
            self.config.concurrency_limit,
            max_rounds
        );

        let mut state = ControllerState::Idle;
        let termination = loop {
            state = match state {
                ControllerState::Idle => ControllerState::RoundRunning(1),

                ControllerState::RoundRunning(round) => {
                    self.observer.round_started(round, max_rounds, pending.len());
                    let result = run_round(
                        round,
                        &pending,
                        &self.operation,
                        &self.client,
                        &self.config,
                        &aggregator,
                        self.observer.as_ref(),
                    )
                    .await;
                    self.observer.round_finished(&result.summary);
                    ControllerState::RoundEvaluating(round, result)
                }

                ControllerState::RoundEvaluating(round, result) => {
                    pending.clear();
                    carried.clear();
                    for settled in result.settled {
                        match settled {
                            Outcome::Success { .. } => {}
                            Outcome::PermanentFailure { target, reason } => {
                                failed.push(FailedTarget {
                                    target,
                                    reason,
                                    round,
                                    retryable: false,
                                })
                            }
                            Outcome::RetryableFailure { target, reason } => {
                                pending.push(target.clone());
                                carried.push(FailedTarget {
                                    target,
                                    reason,
                                    round,
                                    retryable: true,
                                });
                            }
                        }
                    }
                    rounds.push(result.summary);

                    if pending.is_empty() {
                        ControllerState::Drained
                    } else if round >= max_rounds {
                        ControllerState::Exhausted
                    } else if self.cooldown(round, pending.len()).await {
                        cooldowns += 1;
                        ControllerState::RoundRunning(round + 1)
                    } else {
                        ControllerState::Cancelled
                    }
                }

                ControllerState::Drained => break Termination::Drained,
                ControllerState::Exhausted => break Termination::Exhausted,
                ControllerState::Cancelled => break Termination::Cancelled,
            };
        };

        failed.append(&mut carried);

        let report = RunReport {
            operation: operation_name,
            total_initial,
            succeeded: aggregator.succeeded(),
            failed,
            rounds,
            cooldowns,
            termination,
            started_at,
            finished_at: Utc::now(),
            elapsed: started.elapsed(),
        };

        tracing::info!(
            "{} run {} after {} round(s): {}/{} succeeded, {} failed, {:?}",
            report.operation,
            report.termination,
            report.rounds_run(),
            report.succeeded,
            report.total_initial,
            report.failed_count(),
            report.elapsed
        );

        RunOutput {
            report,
            payloads: aggregator.into_payloads(),
        }
    }

    /// Waits out the inter-round cooldown; returns false when cancelled
    async fn cooldown(&self, round: u32, pending: usize) -> bool {
        if self.cancel.is_cancelled() {
            tracing::info!("Cancellation requested after round {}", round);
            return false;
        }

        tracing::debug!(
            "Cooling down {:?} before retrying {} target(s)",
            self.config.inter_round_cooldown,
            pending
        );

        tokio::select! {
            _ = self.cancel.cancelled() => {
                tracing::info!("Cancellation requested during cooldown after round {}", round);
                false
            }
            _ = tokio::time::sleep(self.config.inter_round_cooldown) => true,
        }
    }
}
