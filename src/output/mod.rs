//! Output module for reporting run results
//!
//! This module handles:
//! - Generating markdown summaries of a run
//! - Writing the list of targets that never succeeded
//! - Exporting fetched articles as CSV, grouped by author
//! - Printing reports and run history to the console
//! - Rendering live progress bars while rounds execute

mod articles;
mod failed;
mod markdown;
mod progress;
pub mod stats;

pub use articles::write_articles;
pub use failed::write_failed_targets;
pub use markdown::{format_run_summary, write_run_summary};
pub use progress::ProgressBarObserver;
pub use stats::{print_report, print_run_history};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
