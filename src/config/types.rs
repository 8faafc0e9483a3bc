use crate::engine::EngineConfig;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Default browser-like user agent sent with every request
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration structure for Sumi-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub engine: RoundsConfig,
    #[serde(default = "WorkloadConfig::fetch_defaults")]
    pub fetch: WorkloadConfig,
    #[serde(default = "WorkloadConfig::like_defaults")]
    pub like: WorkloadConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Engine settings for the fetch-and-extract workload
    pub fn fetch_engine(&self) -> EngineConfig {
        self.engine.with_workload(&self.fetch)
    }

    /// Engine settings for the like workload
    pub fn like_engine(&self) -> EngineConfig {
        self.engine.with_workload(&self.like)
    }
}

/// Target site and the session handed over by the login step
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Root URL of the blog, e.g. `https://blog.example.com`
    #[serde(rename = "base-url")]
    pub base_url: String,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Session cookies (name -> value)
    #[serde(default)]
    pub cookies: BTreeMap<String, String>,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Round controller settings shared by both workloads
#[derive(Debug, Clone, Deserialize)]
pub struct RoundsConfig {
    /// Hard ceiling on the number of rounds
    #[serde(rename = "max-rounds", default = "default_max_rounds")]
    pub max_rounds: u32,

    /// Pause between rounds that left retryable targets (milliseconds)
    #[serde(
        rename = "inter-round-cooldown-ms",
        default = "default_inter_round_cooldown_ms"
    )]
    pub inter_round_cooldown_ms: u64,
}

fn default_max_rounds() -> u32 {
    5
}

fn default_inter_round_cooldown_ms() -> u64 {
    1000
}

impl Default for RoundsConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            inter_round_cooldown_ms: default_inter_round_cooldown_ms(),
        }
    }
}

impl RoundsConfig {
    fn with_workload(&self, workload: &WorkloadConfig) -> EngineConfig {
        EngineConfig {
            concurrency_limit: workload.concurrency,
            operation_timeout: Duration::from_secs(workload.timeout_secs),
            max_rounds: self.max_rounds,
            inter_round_cooldown: Duration::from_millis(self.inter_round_cooldown_ms),
        }
    }
}

/// Worker pool size and per-request timeout for one kind of operation
#[derive(Debug, Clone, Deserialize)]
pub struct WorkloadConfig {
    pub concurrency: usize,

    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,
}

impl WorkloadConfig {
    /// Read-heavy article fetches: small pool, generous timeout
    pub fn fetch_defaults() -> Self {
        Self {
            concurrency: 5,
            timeout_secs: 20,
        }
    }

    /// Lightweight like submissions: wide pool, short timeout
    pub fn like_defaults() -> Self {
        Self {
            concurrency: 20,
            timeout_secs: 5,
        }
    }
}

/// Where the target list comes from
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    #[serde(rename = "targets-path")]
    pub targets_path: String,

    /// Column holding the article URL when the target file is a table
    #[serde(rename = "url-column", default)]
    pub url_column: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,

    /// Path to the line-delimited list of targets that never succeeded
    #[serde(rename = "failed-path", default = "default_failed_path")]
    pub failed_path: String,

    /// Path to the CSV export of fetched articles, sorted by author
    #[serde(rename = "articles-path", default = "default_articles_path")]
    pub articles_path: String,
}

fn default_failed_path() -> String {
    "failed_urls.txt".to_string()
}

fn default_articles_path() -> String {
    "article_details.csv".to_string()
}
