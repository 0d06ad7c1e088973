//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - retrieves the source CSV
//! - runs the analytics pipeline
//! - renders charts and writes artifacts
//! - prints the report

use std::time::Duration;

use chrono::{Local, NaiveDateTime, Timelike};
use clap::Parser;
use log::info;

use crate::cli::{Command, FetchArgs, RunArgs};
use crate::domain::DashboardConfig;
use crate::error::AppError;
use crate::io::{load_source, read_rows, write_artifacts};

pub mod pipeline;

/// Entry point for the `epi` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Run(args) => handle_run(&args, OutputMode::Artifacts),
        Command::Summary(args) => handle_run(&args, OutputMode::ReportOnly),
        Command::Fetch(args) => handle_fetch(&args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Artifacts,
    ReportOnly,
}

fn handle_run(args: &RunArgs, mode: OutputMode) -> Result<(), AppError> {
    let config = dashboard_config_from_args(args);
    let now = resolve_now(config.now);
    info!("Run for '{}' as of {now}", config.country);

    let bytes = load_source(&config.source, Duration::from_secs(config.timeout_secs), config.retries)?;
    let ingested = read_rows(bytes.as_slice())?;
    let output = pipeline::run_pipeline(&ingested.rows, &config.pipeline(), now)?;

    if mode == OutputMode::Artifacts {
        // Everything is rendered before anything is written.
        let charts = if config.charts {
            crate::plot::render_charts(&output, config.window)?
        } else {
            Vec::new()
        };
        let written = write_artifacts(&config.out_dir, &output, &charts)?;
        for path in &written {
            info!("wrote {}", path.display());
        }
    }

    println!("{}", crate::report::format_run_summary(&output));
    Ok(())
}

fn handle_fetch(args: &FetchArgs) -> Result<(), AppError> {
    let bytes = load_source(
        &args.source.source,
        Duration::from_secs(args.source.timeout_secs),
        args.source.retries,
    )?;
    let dir = args
        .output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let name = args
        .output
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::new(2, format!("Invalid output path '{}'.", args.output.display())))?;

    let mut staged = crate::io::StagedArtifacts::new(dir)?;
    staged.stage_bytes(name, &bytes)?;
    staged.commit()?;
    println!("Saved {} byte(s) to {}", bytes.len(), args.output.display());
    Ok(())
}

pub fn dashboard_config_from_args(args: &RunArgs) -> DashboardConfig {
    DashboardConfig {
        source: args.source.source.clone(),
        country: args.country.clone(),
        out_dir: args.out_dir.clone(),
        window: args.window,
        now: args.now,
        charts: !args.no_charts,
        timeout_secs: args.source.timeout_secs,
        retries: args.source.retries,
    }
}

/// The run timestamp: the override if given, else local wall-clock time
/// truncated to whole seconds.
fn resolve_now(override_now: Option<NaiveDateTime>) -> NaiveDateTime {
    override_now.unwrap_or_else(|| {
        let now = Local::now().naive_local();
        now.with_nanosecond(0).unwrap_or(now)
    })
}
