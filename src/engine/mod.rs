//! Multi-round concurrent fetch engine
//!
//! This module contains the transport-agnostic core:
//! - Outcome classification types for a single unit of work
//! - The `Operation` capability executed per target
//! - A bounded-concurrency round executor
//! - The round controller state machine and its run report
//! - A thread-safe result aggregator and progress observers

mod aggregator;
mod controller;
mod executor;
mod observer;
mod operation;
mod outcome;
mod report;

pub use aggregator::{AggregateSnapshot, Aggregator};
pub use controller::RoundController;
pub use executor::{run_round, RoundResult};
pub use observer::{NoopObserver, ProgressObserver, RoundProgress, TracingObserver};
pub use operation::Operation;
pub use outcome::{FailureClass, FailureReason, Outcome, OutcomeKind, Settled, Target};
pub use report::{FailedTarget, RoundSummary, RunOutput, RunReport, Termination};

use crate::SweepError;
use std::time::Duration;

/// Tunables for one engine run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of operations in flight at once
    pub concurrency_limit: usize,
    /// Upper bound on a single operation; exceeding it is a retryable timeout
    pub operation_timeout: Duration,
    /// Hard ceiling on the number of rounds
    pub max_rounds: u32,
    /// Pause inserted before every retry round
    pub inter_round_cooldown: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 5,
            operation_timeout: Duration::from_secs(20),
            max_rounds: 5,
            inter_round_cooldown: Duration::from_secs(1),
        }
    }
}

impl EngineConfig {
    /// Rejects settings under which no round could make progress
    pub fn validate(&self) -> Result<(), SweepError> {
        if self.concurrency_limit == 0 {
            return Err(SweepError::InvalidEngineConfig(
                "concurrency_limit must be at least 1".to_string(),
            ));
        }

        if self.max_rounds == 0 {
            return Err(SweepError::InvalidEngineConfig(
                "max_rounds must be at least 1".to_string(),
            ));
        }

        if self.operation_timeout.is_zero() {
            return Err(SweepError::InvalidEngineConfig(
                "operation_timeout must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}
