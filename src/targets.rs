//! Loading the target list
//!
//! Two input shapes are accepted:
//! - a plain list, one target per line
//! - a comma-separated table with a header row, from which one named column
//!   is read (the listing export carries `author,url` rows)
//!
//! Order is preserved and duplicates are kept; each occurrence is an
//! independent unit of work.

use crate::engine::Target;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading the target list
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Target file not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Column '{column}' not found in header of {path}")]
    MissingColumn { column: String, path: String },

    #[error("Malformed row {line}: {message}")]
    Malformed { line: usize, message: String },
}

/// Reads targets from `path`, as a table when `url_column` is given
pub fn load_targets(path: &Path, url_column: Option<&str>) -> Result<Vec<Target>, TargetError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(TargetError::NotFound(path.display().to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    let targets = match url_column {
        Some(column) => parse_table(&content, column).map_err(|e| match e {
            TargetError::MissingColumn { column, .. } => TargetError::MissingColumn {
                column,
                path: path.display().to_string(),
            },
            other => other,
        })?,
        None => parse_line_list(&content),
    };

    tracing::info!("Loaded {} targets from {}", targets.len(), path.display());
    Ok(targets)
}

/// One target per non-blank line
pub fn parse_line_list(content: &str) -> Vec<Target> {
    strip_bom(content)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Target::from)
        .collect()
}

/// Reads `column` out of a comma-separated table with a header row
///
/// Quoted cells may span lines. Rows with an empty cell in that column are
/// skipped.
pub fn parse_table(content: &str, column: &str) -> Result<Vec<Target>, TargetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(strip_bom(content).as_bytes());

    let header = reader.headers().map_err(malformed)?;
    if header.is_empty() {
        return Ok(Vec::new());
    }
    let index = header
        .iter()
        .position(|name| name == column)
        .ok_or_else(|| TargetError::MissingColumn {
            column: column.to_string(),
            path: String::new(),
        })?;

    let mut targets = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed)?;
        match record.get(index) {
            Some(cell) if !cell.is_empty() => targets.push(Target::from(cell)),
            _ => tracing::debug!(
                "Skipping row {} without a value in '{}'",
                record.position().map_or(0, |p| p.line()),
                column
            ),
        }
    }

    Ok(targets)
}

fn malformed(error: csv::Error) -> TargetError {
    TargetError::Malformed {
        line: error.position().map_or(0, |p| p.line() as usize),
        message: error.to_string(),
    }
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}
