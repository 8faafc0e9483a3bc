//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::engine::{FailedTarget, RunReport};
use crate::site::ArticleRecord;
use crate::storage::{FailedTargetRecord, RunRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Records what each run produced: extracted articles, the final failure
/// set and the run report itself.
pub trait Storage {
    // ===== Run Management =====

    /// Opens a run record before the first round
    ///
    /// # Arguments
    ///
    /// * `operation` - Name of the operation being run
    /// * `config_hash` - Hash of the configuration file
    /// * `total_targets` - Size of the initial target list
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(
        &mut self,
        operation: &str,
        config_hash: &str,
        total_targets: usize,
    ) -> StorageResult<i64>;

    /// Stores the final report of a run
    fn finish_run(&mut self, run_id: i64, report: &RunReport) -> StorageResult<()>;

    /// Stores the final report, its failure set and the extracted articles
    /// in one transaction; on error nothing is written
    fn complete_run(
        &mut self,
        run_id: i64,
        report: &RunReport,
        articles: &[ArticleRecord],
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Most recent runs, newest first
    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>>;

    // ===== Results =====

    /// Stores extracted articles, returning how many rows were written
    fn insert_articles(&mut self, run_id: i64, articles: &[ArticleRecord]) -> StorageResult<usize>;

    /// Articles of a run sorted by author, then by id
    fn articles_by_author(&self, run_id: i64) -> StorageResult<Vec<ArticleRecord>>;

    /// Number of articles per author for a run, sorted by author
    fn author_counts(&self, run_id: i64) -> StorageResult<Vec<(String, u64)>>;

    /// Stores the final failure set of a run
    fn record_failures(&mut self, run_id: i64, failures: &[FailedTarget]) -> StorageResult<()>;

    fn failed_targets(&self, run_id: i64) -> StorageResult<Vec<FailedTargetRecord>>;
}
