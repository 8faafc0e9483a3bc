//! Sumi-Sweep main entry point
//!
//! This is the command-line interface for the Sumi-Sweep bulk fetcher.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sumi_sweep::config::{load_config_with_hash, Config};
use sumi_sweep::engine::{
    EngineConfig, Operation, ProgressObserver, RoundController, RunOutput, RunReport, Target,
    TracingObserver,
};
use sumi_sweep::output::{
    print_report, print_run_history, write_articles, write_failed_targets, write_run_summary,
    ProgressBarObserver,
};
use sumi_sweep::site::{FetchArticle, LikeArticle, SiteClient};
use sumi_sweep::storage::{open_storage, SqliteStorage, Storage};
use sumi_sweep::targets::load_targets;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Runs shown by `--stats`
const HISTORY_LIMIT: usize = 10;

/// Sumi-Sweep: a multi-round bulk fetcher
///
/// Sumi-Sweep drives one request per article URL through a bounded worker
/// pool, retries transient failures over several rounds, and records what
/// succeeded and what did not.
#[derive(Parser, Debug)]
#[command(name = "sumi-sweep")]
#[command(version = "1.0.0")]
#[command(about = "A multi-round bulk fetcher for authenticated article endpoints", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Operation to run against every target
    #[arg(long, value_enum, default_value_t = Mode::Fetch)]
    mode: Mode,

    /// Target list, overriding `input.targets-path` from the config
    #[arg(long, value_name = "PATH")]
    targets: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and targets without sending any request
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show run history from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Log round progress instead of drawing a progress bar
    #[arg(long)]
    no_progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Fetch every article's JSON record and store it
    Fetch,
    /// Like every article
    Like,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.stats {
        return handle_stats(&config);
    }

    let targets_path = cli
        .targets
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.input.targets_path));
    let targets = load_targets(&targets_path, config.input.url_column.as_deref())
        .with_context(|| format!("failed to load targets from {}", targets_path.display()))?;

    if cli.dry_run {
        handle_dry_run(&config, cli.mode, &targets_path, &targets);
        return Ok(());
    }

    let client = SiteClient::new(&config.site).context("failed to build HTTP client")?;
    let mut storage = open_storage(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open {}", config.output.database_path))?;

    let sweep = Sweep {
        config: &config,
        config_hash: &config_hash,
        show_progress: !cli.no_progress && !cli.quiet,
        cancel: install_ctrl_c_handler(),
    };

    match cli.mode {
        Mode::Fetch => {
            let operation = FetchArticle::new(config.fetch_engine().operation_timeout);
            let (run_id, RunOutput { report, payloads }) = sweep
                .run(operation, config.fetch_engine(), client, targets, &mut storage)
                .await?;
            sweep.write_failed_list(&report)?;
            storage.complete_run(run_id, &report, &payloads)?;
            tracing::info!("Stored {} articles", payloads.len());

            let articles = storage.articles_by_author(run_id)?;
            let articles_path = Path::new(&config.output.articles_path);
            write_articles(&articles, articles_path)
                .with_context(|| format!("failed to write {}", articles_path.display()))?;

            sweep.summarize(&storage, run_id, &report)
        }
        Mode::Like => {
            let operation = LikeArticle::new(config.like_engine().operation_timeout);
            let (run_id, RunOutput { report, .. }) = sweep
                .run(operation, config.like_engine(), client, targets, &mut storage)
                .await?;
            sweep.write_failed_list(&report)?;
            storage.complete_run(run_id, &report, &[])?;

            sweep.summarize(&storage, run_id, &report)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_sweep=info,warn"),
            1 => EnvFilter::new("sumi_sweep=debug,info"),
            2 => EnvFilter::new("sumi_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Cancels the returned token on the first Ctrl-C
fn install_ctrl_c_handler() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current round");
            token.cancel();
        }
    });

    cancel
}

/// Handles the --dry-run mode: validates config and targets, sends nothing
fn handle_dry_run(config: &Config, mode: Mode, targets_path: &Path, targets: &[Target]) {
    let engine = match mode {
        Mode::Fetch => config.fetch_engine(),
        Mode::Like => config.like_engine(),
    };

    println!("=== Sumi-Sweep Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  User agent: {}", config.site.user_agent);
    println!(
        "  Cookies: {}",
        config.site.cookies.keys().cloned().collect::<Vec<_>>().join(", ")
    );

    println!("\nEngine ({:?}):", mode);
    println!("  Concurrency: {}", engine.concurrency_limit);
    println!("  Operation timeout: {:?}", engine.operation_timeout);
    println!("  Max rounds: {}", engine.max_rounds);
    println!("  Cooldown: {:?}", engine.inter_round_cooldown);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);
    println!("  Failed list: {}", config.output.failed_path);
    println!("  Articles: {}", config.output.articles_path);

    println!("\nTargets: {} from {}", targets.len(), targets_path.display());
    for target in targets.iter().take(5) {
        println!("  - {}", target);
    }
    if targets.len() > 5 {
        println!("  ... and {} more", targets.len() - 5);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows run history from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open {}", config.output.database_path))?;
    print_run_history(&storage, HISTORY_LIMIT)?;

    Ok(())
}

/// Settings shared by both modes of a sweep
struct Sweep<'a> {
    config: &'a Config,
    config_hash: &'a str,
    show_progress: bool,
    cancel: CancellationToken,
}

impl Sweep<'_> {
    /// Opens a run row and drives `operation` over `targets` to a report
    async fn run<O>(
        &self,
        operation: O,
        engine: EngineConfig,
        client: SiteClient,
        targets: Vec<Target>,
        storage: &mut SqliteStorage,
    ) -> anyhow::Result<(i64, RunOutput<O::Payload>)>
    where
        O: Operation<Client = SiteClient>,
    {
        let name = operation.name();
        let total = targets.len();
        let controller = RoundController::new(targets, operation, client, engine)?;
        let run_id = storage.create_run(name, self.config_hash, total)?;
        tracing::info!(
            "Starting {} run #{} over {} targets ({} workers, {} rounds max)",
            name,
            run_id,
            total,
            controller.config().concurrency_limit,
            controller.config().max_rounds
        );

        let progress = self.show_progress.then(|| Arc::new(ProgressBarObserver::new()));
        let observer: Arc<dyn ProgressObserver> = match &progress {
            Some(bar) => Arc::clone(bar) as Arc<dyn ProgressObserver>,
            None => Arc::new(TracingObserver),
        };

        let output = controller
            .with_observer(observer)
            .with_cancellation(self.cancel.clone())
            .run()
            .await;

        if let Some(bar) = progress {
            bar.finish();
        }

        Ok((run_id, output))
    }

    /// Writes the retry list; runs before anything touches the database
    fn write_failed_list(&self, report: &RunReport) -> anyhow::Result<()> {
        let failed_path = Path::new(&self.config.output.failed_path);
        write_failed_targets(report, failed_path)
            .with_context(|| format!("failed to write {}", failed_path.display()))?;
        Ok(())
    }

    /// Writes the markdown summary and prints the console report
    fn summarize(
        &self,
        storage: &SqliteStorage,
        run_id: i64,
        report: &RunReport,
    ) -> anyhow::Result<()> {
        let authors = storage.author_counts(run_id)?;
        let summary_path = Path::new(&self.config.output.summary_path);
        write_run_summary(report, self.config_hash, &authors, summary_path)
            .with_context(|| format!("failed to write {}", summary_path.display()))?;
        tracing::info!("Summary written to {}", summary_path.display());

        print_report(report);

        Ok(())
    }
}
