//! outline-sync CLI
//!
//! Syncs the repository's markdown docs into Outline.
//!
//! ```text
//! OUTLINE_API_TOKEN=... outline-sync
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use outline_sync_core::{
    api_token, sync_repository, OutlineClient, SyncConfig, SyncError, SyncPaths, SyncReport,
};

#[derive(Parser)]
#[command(name = "outline-sync")]
#[command(about = "Sync local markdown docs to an Outline collection")]
#[command(version)]
struct Cli {
    /// Repository root containing outline_sync/ and docs/ (defaults to the current directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Verbose output (debug logging)
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet mode - only warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            if let Some(note) = failure_note(&e) {
                eprintln!("{}", note);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let paths = SyncPaths::new(root);

    let config = SyncConfig::load(&paths)?;
    let token = api_token()?;
    debug!("Using Outline API at {}", config.api_url);

    let client = OutlineClient::new(&config.api_url, token)?;
    let report = sync_repository(&paths, &config, &client)?;

    if !cli.quiet {
        print_summary(&report, &paths);
    }
    Ok(())
}

fn print_summary(report: &SyncReport, paths: &SyncPaths) {
    println!();
    for line in summary_lines(report, paths) {
        println!("{}", line);
    }
}

fn summary_lines(report: &SyncReport, paths: &SyncPaths) -> Vec<String> {
    let mut lines = Vec::new();
    if report.collection_created {
        lines.push("Created a new Outline collection.".to_string());
    }
    lines.push(format!(
        "Sync complete: {} document(s) synced ({} created, {} updated), {} skipped.",
        report.synced_count(),
        report.created.len(),
        report.updated.len(),
        report.skipped.len()
    ));
    lines.push(format!(
        "State saved to {} ({} document(s) tracked)",
        paths.state_path().display(),
        report.tracked
    ));
    lines
}

/// Extra hint about what state a failed run left behind
fn failure_note(err: &anyhow::Error) -> Option<&'static str> {
    let err = err.downcast_ref::<SyncError>()?;
    if err.is_configuration() {
        Some("Nothing was sent to Outline.")
    } else if err.is_remote() {
        Some("State file left unchanged.")
    } else {
        None
    }
}

/// Log to stderr; RUST_LOG overrides the flag-derived level
fn init_logging(cli: &Cli) {
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "outline_sync_core={},outline_sync={}",
            log_level, log_level
        ))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
