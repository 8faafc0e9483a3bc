//! Sumi-Sweep: a multi-round bulk fetcher for authenticated article endpoints
//!
//! This crate drives one network operation per target URL through a bounded
//! worker pool, classifies every outcome as success, retryable failure or
//! permanent failure, and re-drives the retryable subset over a bounded
//! number of rounds before producing a run report.

pub mod config;
pub mod engine;
pub mod output;
pub mod site;
pub mod storage;
pub mod targets;

use thiserror::Error;

/// Main error type for Sumi-Sweep operations
///
/// None of these variants is ever produced for a single target; per-target
/// failures are captured as [`engine::Outcome`] values instead.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Target list is empty, nothing to process")]
    EmptyTargets,

    #[error("Invalid engine configuration: {0}")]
    InvalidEngineConfig(String),

    #[error("Invalid client: {0}")]
    InvalidClient(String),

    #[error("Target list error: {0}")]
    Targets(#[from] targets::TargetError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sumi-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use engine::{EngineConfig, Outcome, RoundController, RunReport, Target, Termination};
pub use site::{ArticleRecord, FetchArticle, LikeArticle, SiteClient};
