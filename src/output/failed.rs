//! Line-delimited list of targets that never succeeded

use crate::engine::RunReport;
use crate::output::OutputResult;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one failed target per line to `path`
///
/// When the run left no failures a stale file from an earlier run is
/// removed instead, so the file's presence always means work is left.
///
/// Returns the number of targets written.
pub fn write_failed_targets(report: &RunReport, path: &Path) -> OutputResult<usize> {
    if report.failed.is_empty() {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!("Removed stale {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        return Ok(0);
    }

    let mut writer = BufWriter::new(File::create(path)?);
    for target in report.failed_targets() {
        writeln!(writer, "{}", target)?;
    }
    writer.flush()?;

    tracing::info!(
        "Wrote {} failed targets to {}",
        report.failed_count(),
        path.display()
    );
    Ok(report.failed_count())
}
