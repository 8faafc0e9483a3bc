//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a run,
//! including totals, the per-round breakdown and the final failure set.

use crate::engine::RunReport;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Failed targets listed in full before the summary truncates
const MAX_LISTED_FAILURES: usize = 100;

/// Writes a markdown summary of `report` to `output_path`
///
/// # Arguments
///
/// * `report` - The final run report
/// * `config_hash` - Hash of the configuration the run used
/// * `authors` - Article counts per author (empty for operations without payloads)
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn write_run_summary(
    report: &RunReport,
    config_hash: &str,
    authors: &[(String, u64)],
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_run_summary(report, config_hash, authors);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a run report as markdown
pub fn format_run_summary(report: &RunReport, config_hash: &str, authors: &[(String, u64)]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Sumi-Sweep Run Summary ({})\n\n", report.operation));

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        report.elapsed.as_secs_f64()
    ));
    md.push_str(&format!("- **Termination**: {}\n", report.termination));
    md.push_str(&format!("- **Config Hash**: {}\n\n", config_hash));

    md.push_str("## Totals\n\n");
    md.push_str(&format!("- **Targets**: {}\n", report.total_initial));
    md.push_str(&format!("- **Succeeded**: {}\n", report.succeeded));
    md.push_str(&format!("- **Failed**: {}\n", report.failed_count()));
    md.push_str(&format!("- **Success Rate**: {:.2}%\n", report.success_rate()));
    md.push_str(&format!("- **Rounds**: {}\n", report.rounds_run()));
    md.push_str(&format!("- **Cooldowns**: {}\n\n", report.cooldowns));

    if !report.rounds.is_empty() {
        md.push_str("## Rounds\n\n");
        md.push_str("| Round | Submitted | Succeeded | Permanent | Retryable | Elapsed |\n");
        md.push_str("|-------|-----------|-----------|-----------|-----------|---------|\n");
        for round in &report.rounds {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {:.2}s |\n",
                round.round,
                round.submitted,
                round.succeeded,
                round.permanent,
                round.retryable,
                round.elapsed.as_secs_f64()
            ));
        }
        md.push('\n');
    }

    if !authors.is_empty() {
        md.push_str("## Articles by Author\n\n");
        md.push_str("| Author | Articles |\n");
        md.push_str("|--------|----------|\n");
        for (author, count) in authors {
            md.push_str(&format!("| {} | {} |\n", author, count));
        }
        md.push('\n');
    }

    if !report.failed.is_empty() {
        md.push_str("## Failed Targets\n\n");
        md.push_str("| Target | Reason | Last Round | Retryable |\n");
        md.push_str("|--------|--------|------------|-----------|\n");

        for failed in report.failed.iter().take(MAX_LISTED_FAILURES) {
            md.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                failed.target,
                failed.reason,
                failed.round,
                if failed.retryable { "yes" } else { "no" }
            ));
        }
        if report.failed.len() > MAX_LISTED_FAILURES {
            md.push_str(&format!(
                "\n... and {} more\n",
                report.failed.len() - MAX_LISTED_FAILURES
            ));
        }
        md.push('\n');
    }

    md
}
