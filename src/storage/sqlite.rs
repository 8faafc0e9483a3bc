//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::engine::{FailedTarget, RunReport};
use crate::site::ArticleRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{FailedTargetRecord, RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, operation, started_at, finished_at, config_hash, status, \
                           total_targets, succeeded, failed, rounds, cooldowns, elapsed_ms";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        operation: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).unwrap_or(RunStatus::Running),
        total_targets: row.get(6)?,
        succeeded: row.get(7)?,
        failed: row.get(8)?,
        rounds: row.get(9)?,
        cooldowns: row.get(10)?,
        elapsed_ms: row.get(11)?,
    })
}

fn article_from_row(row: &Row<'_>) -> rusqlite::Result<ArticleRecord> {
    Ok(ArticleRecord {
        author: row.get(0)?,
        id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        date: row.get(4)?,
        source_url: row.get(5)?,
    })
}

fn update_run(conn: &Connection, run_id: i64, report: &RunReport) -> StorageResult<()> {
    let updated = conn.execute(
        "UPDATE runs
         SET started_at = ?1, finished_at = ?2, status = ?3, succeeded = ?4,
             failed = ?5, rounds = ?6, cooldowns = ?7, elapsed_ms = ?8
         WHERE id = ?9",
        params![
            report.started_at.to_rfc3339(),
            report.finished_at.to_rfc3339(),
            RunStatus::Finished(report.termination).to_db_string(),
            report.succeeded as i64,
            report.failed_count() as i64,
            report.rounds_run(),
            report.cooldowns,
            report.elapsed.as_millis() as i64,
            run_id
        ],
    )?;

    if updated == 0 {
        return Err(StorageError::RunNotFound(run_id));
    }
    Ok(())
}

fn insert_article_rows(
    conn: &Connection,
    run_id: i64,
    articles: &[ArticleRecord],
) -> StorageResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO articles (run_id, article_id, author, title, content, published, source_url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for article in articles {
        stmt.execute(params![
            run_id,
            article.id,
            article.author,
            article.title,
            article.content,
            article.date,
            article.source_url
        ])?;
    }
    Ok(())
}

fn insert_failure_rows(
    conn: &Connection,
    run_id: i64,
    failures: &[FailedTarget],
) -> StorageResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO failed_targets (run_id, target, reason, round, retryable)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for failure in failures {
        stmt.execute(params![
            run_id,
            failure.target.as_str(),
            failure.reason.to_string(),
            failure.round,
            failure.retryable
        ])?;
    }
    Ok(())
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(
        &mut self,
        operation: &str,
        config_hash: &str,
        total_targets: usize,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (operation, started_at, config_hash, status, total_targets)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                operation,
                now,
                config_hash,
                RunStatus::Running.to_db_string(),
                total_targets as i64
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(&mut self, run_id: i64, report: &RunReport) -> StorageResult<()> {
        update_run(&self.conn, run_id, report)
    }

    fn complete_run(
        &mut self,
        run_id: i64,
        report: &RunReport,
        articles: &[ArticleRecord],
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        update_run(&tx, run_id, report)?;
        insert_failure_rows(&tx, run_id, &report.failed)?;
        insert_article_rows(&tx, run_id, articles)?;
        tx.commit()?;

        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS))?;

        stmt.query_row(params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn recent_runs(&self, limit: usize) -> StorageResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM runs ORDER BY id DESC LIMIT ?1",
            RUN_COLUMNS
        ))?;

        let runs = stmt
            .query_map(params![limit as i64], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(runs)
    }

    // ===== Results =====

    fn insert_articles(&mut self, run_id: i64, articles: &[ArticleRecord]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        insert_article_rows(&tx, run_id, articles)?;
        tx.commit()?;

        Ok(articles.len())
    }

    fn articles_by_author(&self, run_id: i64) -> StorageResult<Vec<ArticleRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT author, article_id, title, content, published, source_url
             FROM articles
             WHERE run_id = ?1
             ORDER BY author ASC, article_id ASC",
        )?;

        let articles = stmt
            .query_map(params![run_id], article_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(articles)
    }

    fn author_counts(&self, run_id: i64) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT author, COUNT(*)
             FROM articles
             WHERE run_id = ?1
             GROUP BY author
             ORDER BY author ASC",
        )?;

        let counts = stmt
            .query_map(params![run_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    fn record_failures(&mut self, run_id: i64, failures: &[FailedTarget]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        insert_failure_rows(&tx, run_id, failures)?;
        tx.commit()?;

        Ok(())
    }

    fn failed_targets(&self, run_id: i64) -> StorageResult<Vec<FailedTargetRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT target, reason, round, retryable
             FROM failed_targets
             WHERE run_id = ?1
             ORDER BY id",
        )?;

        let failures = stmt
            .query_map(params![run_id], |row| {
                Ok(FailedTargetRecord {
                    target: row.get(0)?,
                    reason: row.get(1)?,
                    round: row.get(2)?,
                    retryable: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(failures)
    }
}
