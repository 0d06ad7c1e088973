//! Command-line parsing for the epidemiological dashboard generator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the analytics code. Options fall back to environment
//! variables (optionally loaded from `.env`).

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_COUNTRY, DEFAULT_SOURCE_URL, DEFAULT_WINDOW};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "epi", version, about = "Daily epidemiological dashboard generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the pipeline, write summary/series/chart artifacts, and print the report.
    Run(RunArgs),
    /// Run the pipeline and print the report only (no files written).
    Summary(RunArgs),
    /// Download the source CSV to a local file.
    Fetch(FetchArgs),
}

/// Source retrieval options.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Source CSV: an http(s) URL or a local path.
    #[arg(long, env = "EPI_SOURCE", default_value = DEFAULT_SOURCE_URL)]
    pub source: String,

    /// Per-request timeout for remote sources (seconds).
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,

    /// Extra attempts after a failed download.
    #[arg(long, default_value_t = 2)]
    pub retries: u32,
}

/// Options shared by `run` and `summary`.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Country to report on (matches the `Country` column, case-insensitive).
    #[arg(short = 'c', long, env = "EPI_COUNTRY", default_value = DEFAULT_COUNTRY)]
    pub country: String,

    /// Directory for generated artifacts.
    #[arg(short = 'o', long, env = "EPI_OUT_DIR", default_value = "out")]
    pub out_dir: PathBuf,

    /// Rolling-mean window (days).
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    pub window: usize,

    /// Override the run timestamp (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS).
    #[arg(long, value_parser = parse_now)]
    pub now: Option<NaiveDateTime>,

    /// Skip SVG chart rendering.
    #[arg(long)]
    pub no_charts: bool,
}

/// Options for `fetch`.
#[derive(Debug, Args, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Destination file.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: PathBuf,
}

/// Parse a `--now` override. A bare date means midnight.
pub fn parse_now(s: &str) -> Result<NaiveDateTime, String> {
    const FMTS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];
    for fmt in FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("Invalid timestamp '{s}'. Expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_now_accepts_date_and_datetime() {
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(parse_now("2024-03-09"), Ok(midnight));
        let later = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap().and_hms_opt(6, 30, 5).unwrap();
        assert_eq!(parse_now("2024-03-09T06:30:05"), Ok(later));
        assert!(parse_now("yesterday").is_err());
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "epi", "run", "--source", "who.csv", "--country", "Chile", "--window", "3", "--now", "2024-02-01",
            "--no-charts",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.source.source, "who.csv");
        assert_eq!(args.country, "Chile");
        assert_eq!(args.window, 3);
        assert!(args.no_charts);
        assert_eq!(args.now.map(|n| n.date()), NaiveDate::from_ymd_opt(2024, 2, 1));
    }

    #[test]
    fn fetch_requires_output() {
        assert!(Cli::try_parse_from(["epi", "fetch"]).is_err());
    }

    #[test]
    fn env_fills_unset_flags() {
        // SAFETY: no other test writes these variables or asserts on their defaults.
        unsafe {
            std::env::set_var("EPI_SOURCE", "env.csv");
            std::env::set_var("EPI_COUNTRY", "Chile");
            std::env::set_var("EPI_OUT_DIR", "env-out");
        }
        let from_env = Cli::try_parse_from(["epi", "run"]);
        let flag_wins = Cli::try_parse_from(["epi", "run", "--country", "Peru"]);
        unsafe {
            std::env::remove_var("EPI_SOURCE");
            std::env::remove_var("EPI_COUNTRY");
            std::env::remove_var("EPI_OUT_DIR");
        }

        let Command::Run(args) = from_env.unwrap().command else {
            panic!("expected run");
        };
        assert_eq!(args.source.source, "env.csv");
        assert_eq!(args.country, "Chile");
        assert_eq!(args.out_dir, PathBuf::from("env-out"));

        let Command::Run(args) = flag_wins.unwrap().command else {
            panic!("expected run");
        };
        assert_eq!(args.country, "Peru");
        assert_eq!(args.source.source, "env.csv");
    }
}
