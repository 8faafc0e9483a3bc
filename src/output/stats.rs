//! Console reporting
//!
//! This module prints the final report of a run and the run history kept
//! in the storage layer.

use crate::engine::{RunReport, Termination};
use crate::output::OutputResult;
use crate::storage::{RunRecord, RunStatus, Storage};

/// Failed targets echoed to the console before truncating
const MAX_PRINTED_FAILURES: usize = 20;

/// Prints the final report of a run to stdout
pub fn print_report(report: &RunReport) {
    println!("\n=== {} run finished: {} ===\n", report.operation, report.termination);

    println!("Overview:");
    println!("  Targets: {}", report.total_initial);
    println!("  Succeeded: {}", report.succeeded);
    println!("  Failed: {}", report.failed_count());
    println!(
        "  Rounds: {} (cooldowns: {})",
        report.rounds_run(),
        report.cooldowns
    );
    println!("  Elapsed: {:.2}s", report.elapsed.as_secs_f64());
    println!();

    if !report.failed.is_empty() {
        println!("Failed Targets ({}):", report.failed_count());
        for failed in report.failed.iter().take(MAX_PRINTED_FAILURES) {
            println!("  - {} ({})", failed.target, failed.reason);
        }
        if report.failed.len() > MAX_PRINTED_FAILURES {
            println!("  ... and {} more", report.failed.len() - MAX_PRINTED_FAILURES);
        }
        println!();
    }

    if report.termination == Termination::Cancelled {
        println!("Run was cancelled; unattempted targets are listed as failed.");
    }

    println!(
        "Success Rate: {:.1}% ({} / {} targets)",
        report.success_rate(),
        report.succeeded,
        report.total_initial
    );
}

/// Prints the `limit` most recent runs stored in `storage`
///
/// # Returns
///
/// * `Ok(())` - History printed
/// * `Err(OutputError)` - Failed to query runs
pub fn print_run_history(storage: &dyn Storage, limit: usize) -> OutputResult<()> {
    let runs = storage.recent_runs(limit)?;

    println!("=== Run History ===\n");
    if runs.is_empty() {
        println!("No runs recorded yet.");
        return Ok(());
    }

    for run in &runs {
        println!("{}", format_run_line(run));
    }

    if let Some(latest) = runs.first() {
        let authors = storage.author_counts(latest.id)?;
        if !authors.is_empty() {
            println!("\nArticles by author (run #{}):", latest.id);
            for (author, count) in authors {
                println!("  {}: {}", author, count);
            }
        }

        let failures = storage.failed_targets(latest.id)?;
        if !failures.is_empty() {
            println!("\nFailed targets (run #{}): {}", latest.id, failures.len());
        }
    }

    Ok(())
}

/// One line of the history listing
fn format_run_line(run: &RunRecord) -> String {
    let status = match run.status {
        RunStatus::Running => "running".to_string(),
        RunStatus::Finished(termination) => termination.to_string(),
    };
    let elapsed = run
        .elapsed_ms
        .map(|ms| format!("{:.1}s", ms as f64 / 1000.0))
        .unwrap_or_else(|| "-".to_string());

    format!(
        "#{:<4} {:<6} {:<10} {} ok / {} failed of {} in {} rounds, {}  [{}]",
        run.id,
        run.operation,
        status,
        run.succeeded,
        run.failed,
        run.total_targets,
        run.rounds,
        elapsed,
        run.started_at
    )
}
