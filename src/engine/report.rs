//! The immutable summary produced once per run

use crate::engine::outcome::{FailureReason, Target};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// How the round controller stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// The pending set emptied out
    Drained,
    /// The round ceiling was reached with targets still pending
    Exhausted,
    /// Cancellation was requested between rounds
    Cancelled,
}

impl Termination {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Drained => "drained",
            Self::Exhausted => "exhausted",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "drained" => Some(Self::Drained),
            "exhausted" => Some(Self::Exhausted),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

/// Per-round counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub round: u32,
    pub submitted: usize,
    pub succeeded: usize,
    pub permanent: usize,
    pub retryable: usize,
    pub elapsed: Duration,
}

/// A target whose latest outcome was not a success
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTarget {
    pub target: Target,
    pub reason: FailureReason,
    /// Round of the last attempt
    pub round: u32,
    /// False for permanent failures, true for targets left pending
    pub retryable: bool,
}

/// Final summary of a multi-round execution
#[derive(Debug, Clone)]
pub struct RunReport {
    pub operation: &'static str,
    pub total_initial: usize,
    pub succeeded: usize,
    /// Every permanent failure, followed by whatever was still pending
    pub failed: Vec<FailedTarget>,
    pub rounds: Vec<RoundSummary>,
    pub cooldowns: u32,
    pub termination: Termination,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn rounds_run(&self) -> u32 {
        self.rounds.len() as u32
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn failed_targets(&self) -> impl Iterator<Item = &Target> {
        self.failed.iter().map(|failed| &failed.target)
    }

    /// Success rate as a percentage of the initial target count
    pub fn success_rate(&self) -> f64 {
        if self.total_initial == 0 {
            return 0.0;
        }
        (self.succeeded as f64 / self.total_initial as f64) * 100.0
    }

    /// True when every target succeeded
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.succeeded == self.total_initial
    }
}

/// Report plus the payloads of every successful attempt
#[derive(Debug)]
pub struct RunOutput<P> {
    pub report: RunReport,
    /// Completion order, not input order
    pub payloads: Vec<P>,
}
