//! Storage module for persisting run results
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Run history with the final report counts
//! - Extracted article records
//! - The final failure set of each run

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::engine::Termination;
use std::path::Path;

/// Opens (creating if needed) the database at `path`
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Represents a run in the database
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub operation: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub total_targets: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub rounds: u32,
    pub cooldowns: u32,
    pub elapsed_ms: Option<u64>,
}

/// A stored failed target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTargetRecord {
    pub target: String,
    pub reason: String,
    pub round: u32,
    pub retryable: bool,
}

/// Status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Rounds still executing (or the process died mid-run)
    Running,
    /// Finished with the given termination
    Finished(Termination),
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Finished(termination) => termination.to_db_string(),
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            other => Termination::from_db_string(other).map(Self::Finished),
        }
    }
}
