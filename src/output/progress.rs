//! Terminal progress bar fed by engine events

use crate::engine::{ProgressObserver, RoundProgress, RoundSummary};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const BAR_TEMPLATE: &str =
    "{spinner:.cyan} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}";

/// Renders one bar per round, reset at every round start
pub struct ProgressBarObserver {
    pb: ProgressBar,
}

impl ProgressBarObserver {
    pub fn new() -> Self {
        let pb = ProgressBar::new(0);
        let style = ProgressStyle::with_template(BAR_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Removes the bar from the terminal
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl Default for ProgressBarObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ProgressBarObserver {
    fn round_started(&self, round: u32, max_rounds: u32, pending: usize) {
        self.pb.reset();
        self.pb.set_length(pending as u64);
        self.pb.set_message(format!("round {}/{}", round, max_rounds));
    }

    fn target_completed(&self, progress: &RoundProgress) {
        self.pb.set_position(progress.completed as u64);
        self.pb.set_message(format!(
            "round {} ok={} failed={} retry={}",
            progress.round, progress.succeeded, progress.failed, progress.pending_retry
        ));
    }

    fn round_finished(&self, summary: &RoundSummary) {
        self.pb.println(format!(
            "  round {}: {} ok, {} permanent, {} to retry ({:.1}s)",
            summary.round,
            summary.succeeded,
            summary.permanent,
            summary.retryable,
            summary.elapsed.as_secs_f64()
        ));
    }
}
