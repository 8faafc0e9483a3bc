//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Sumi-Sweep database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per engine run
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    operation TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    total_targets INTEGER NOT NULL,
    succeeded INTEGER NOT NULL DEFAULT 0,
    failed INTEGER NOT NULL DEFAULT 0,
    rounds INTEGER NOT NULL DEFAULT 0,
    cooldowns INTEGER NOT NULL DEFAULT 0,
    elapsed_ms INTEGER
);

-- Extracted article records
CREATE TABLE IF NOT EXISTS articles (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    article_id TEXT NOT NULL,
    author TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    published TEXT NOT NULL,
    source_url TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_articles_run_author ON articles(run_id, author);

-- Targets whose last outcome was not a success
CREATE TABLE IF NOT EXISTS failed_targets (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    target TEXT NOT NULL,
    reason TEXT NOT NULL,
    round INTEGER NOT NULL,
    retryable INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_failed_targets_run ON failed_targets(run_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
