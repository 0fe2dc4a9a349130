//! tfdrift CLI entrypoint.
//!
//! This is the main entrypoint for the tfdrift command-line tool.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tfdrift::cli::{Cli, Commands, DriftReport, DriftWatcher, OutputFormatter, SettingsArgs};
use tfdrift::config::{ConfigValidator, DiffSettings, SettingsParser, find_settings_file};
use tfdrift::error::Result;
use tfdrift::planner::DriftPlanner;
use tfdrift::telemetry::InMemoryMetrics;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    // Load .env before parsing so it can feed the env-backed flags.
    if let Err(e) = SettingsParser::new().load_dotenv() {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<ExitCode> {
    let formatter = OutputFormatter::new(cli.output);
    let settings = load_settings(cli.settings.as_ref(), cli.overrides)?;

    match cli.command {
        Commands::Diff => cmd_diff(settings, &formatter).await,
        Commands::Watch { interval_secs } => cmd_watch(settings, interval_secs, &formatter).await,
        Commands::Validate => cmd_validate(settings, &formatter),
    }
}

/// Run a single drift check.
async fn cmd_diff(settings: DiffSettings, formatter: &OutputFormatter) -> Result<ExitCode> {
    let metrics = Arc::new(InMemoryMetrics::new());
    let config = ConfigValidator::new().validate(settings, metrics.clone())?;

    let outcome = DriftPlanner::new(&config).run().await;
    let report = DriftReport::from_run(&outcome, metrics.observations());

    write_stdout(&formatter.format_report(&report))?;
    Ok(ExitCode::from(report.exit_code()))
}

/// Run drift checks on an interval until interrupted.
async fn cmd_watch(
    settings: DiffSettings,
    interval_secs: u64,
    formatter: &OutputFormatter,
) -> Result<ExitCode> {
    let metrics = Arc::new(InMemoryMetrics::new());
    let config = ConfigValidator::new().validate(settings, metrics.clone())?;

    info!("Watching for drift every {interval_secs}s");
    let watcher = DriftWatcher::new(&config, metrics, Duration::from_secs(interval_secs));
    watcher
        .run(tokio::signal::ctrl_c(), |report, _| {
            write_stdout(&formatter.format_report(report))
        })
        .await?;

    Ok(ExitCode::SUCCESS)
}

/// Validate settings and credentials.
fn cmd_validate(settings: DiffSettings, formatter: &OutputFormatter) -> Result<ExitCode> {
    let config = ConfigValidator::new().validate(settings, Arc::new(InMemoryMetrics::new()))?;
    write_stdout(&formatter.format_config(&config))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Loads the settings file (if any) and overlays command-line values.
fn load_settings(path: Option<&PathBuf>, overrides: SettingsArgs) -> Result<DiffSettings> {
    let path = path.cloned().or_else(|| find_settings_file("."));

    let base = match path {
        Some(path) => SettingsParser::new().load_file(&path)?,
        None => {
            debug!("No settings file found, using flags and defaults");
            DiffSettings::default()
        }
    };

    Ok(base.merge(overrides.into_settings()))
}

/// Writes a rendered report to standard output.
fn write_stdout(content: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    if !content.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
