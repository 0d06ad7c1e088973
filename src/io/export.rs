//! Artifact writing.
//!
//! A run produces a small, fixed set of files. Everything is staged next to
//! its destination under a temporary name and only renamed into place once
//! every artifact was written, so a failure never leaves a mixed set of old
//! and new outputs behind.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Serialize;

use crate::app::pipeline::PipelineOutput;
use crate::domain::{AlignedPair, DailyPoint, SummaryRecord, WeeklyTotal};
use crate::error::AppError;

pub const SUMMARY_FILE: &str = "summary.json";
pub const TIMESTAMP_FILE: &str = "timestamp.txt";
pub const DAILY_FILE: &str = "daily.csv";
pub const ALIGNED_FILE: &str = "aligned.csv";
pub const WEEKLY_FILE: &str = "weekly.csv";

const STAGING_SUFFIX: &str = ".partial";
const BACKUP_SUFFIX: &str = ".previous";

/// A set of files written under temporary names until `commit`.
///
/// Dropping an uncommitted set removes its staged files.
pub struct StagedArtifacts {
    dir: PathBuf,
    staged: Vec<(PathBuf, PathBuf)>,
}

impl StagedArtifacts {
    pub fn new(dir: &Path) -> Result<Self, AppError> {
        fs::create_dir_all(dir)
            .map_err(|e| AppError::new(2, format!("Failed to create output dir '{}': {e}", dir.display())))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            staged: Vec::new(),
        })
    }

    /// Stage a file, filling it through `write`.
    pub fn stage<F>(&mut self, name: &str, write: F) -> Result<(), AppError>
    where
        F: FnOnce(&mut File) -> Result<(), AppError>,
    {
        let target = self.dir.join(name);
        let tmp = self.dir.join(format!("{name}{STAGING_SUFFIX}"));
        let mut file = File::create(&tmp)
            .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", tmp.display())))?;
        // Register before writing so a failed write is cleaned up on drop.
        self.staged.push((tmp.clone(), target));
        write(&mut file)?;
        file.sync_all()
            .map_err(|e| AppError::new(2, format!("Failed to flush '{}': {e}", tmp.display())))?;
        debug!("Staged {}", tmp.display());
        Ok(())
    }

    pub fn stage_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<(), AppError> {
        self.stage(name, |file| {
            file.write_all(bytes)
                .map_err(|e| AppError::new(2, format!("Failed to write '{name}': {e}")))
        })
    }

    /// Move every staged file into place. Returns the final paths.
    ///
    /// Existing targets are set aside first and restored if any rename
    /// fails, so the directory holds either the old set or the new one.
    pub fn commit(mut self) -> Result<Vec<PathBuf>, AppError> {
        for (_, target) in &self.staged {
            if target.exists() && !target.is_file() {
                return Err(AppError::new(
                    2,
                    format!("Cannot replace '{}': not a regular file", target.display()),
                ));
            }
        }

        let mut moved: Vec<(PathBuf, Option<PathBuf>)> = Vec::with_capacity(self.staged.len());
        for (tmp, target) in &self.staged {
            if let Err(err) = replace_file(tmp, target, &mut moved) {
                rollback(&moved);
                return Err(err);
            }
        }

        for backup in moved.iter().filter_map(|(_, backup)| backup.as_ref()) {
            let _ = fs::remove_file(backup);
        }
        // Everything is in place; nothing left for `Drop` to clean.
        let written: Vec<PathBuf> = self.staged.drain(..).map(|(_, target)| target).collect();
        info!("Wrote {} artifact(s) to {}", written.len(), self.dir.display());
        Ok(written)
    }
}

/// Set the current `target` aside (if any) and move `tmp` into its place.
/// Each completed step is recorded in `moved` for `rollback`.
fn replace_file(tmp: &Path, target: &Path, moved: &mut Vec<(PathBuf, Option<PathBuf>)>) -> Result<(), AppError> {
    let backup = if target.exists() {
        let mut name = target.as_os_str().to_os_string();
        name.push(BACKUP_SUFFIX);
        let backup = PathBuf::from(name);
        fs::rename(target, &backup).map_err(|e| {
            AppError::new(2, format!("Failed to set aside '{}': {e}", target.display()))
        })?;
        Some(backup)
    } else {
        None
    };

    if let Err(e) = fs::rename(tmp, target) {
        if let Some(backup) = &backup {
            let _ = fs::rename(backup, target);
        }
        return Err(AppError::new(
            2,
            format!("Failed to move '{}' into place: {e}", target.display()),
        ));
    }
    moved.push((target.to_path_buf(), backup));
    Ok(())
}

/// Undo completed replacements, newest first.
fn rollback(moved: &[(PathBuf, Option<PathBuf>)]) {
    for (target, backup) in moved.iter().rev() {
        let _ = fs::remove_file(target);
        if let Some(backup) = backup {
            let _ = fs::rename(backup, target);
        }
    }
}

impl Drop for StagedArtifacts {
    fn drop(&mut self) {
        for (tmp, _) in &self.staged {
            let _ = fs::remove_file(tmp);
        }
    }
}

/// Write the summary, timestamp, and tabular series for a run.
///
/// `extra` holds pre-rendered files (e.g. SVG charts) written in the same
/// all-or-nothing batch.
pub fn write_artifacts(
    out_dir: &Path,
    output: &PipelineOutput,
    extra: &[(String, String)],
) -> Result<Vec<PathBuf>, AppError> {
    let mut staged = StagedArtifacts::new(out_dir)?;

    staged.stage(SUMMARY_FILE, |file| write_summary_json(file, &output.summary))?;
    staged.stage_bytes(TIMESTAMP_FILE, format_timestamp(&output.summary).as_bytes())?;
    staged.stage(DAILY_FILE, |file| write_daily_csv(file, &output.daily_points()))?;
    staged.stage(ALIGNED_FILE, |file| {
        write_aligned_csv(file, &output.aligned_cases, &output.aligned_deaths)
    })?;
    staged.stage(WEEKLY_FILE, |file| write_weekly_csv(file, &output.weekly))?;
    for (name, contents) in extra {
        staged.stage_bytes(name, contents.as_bytes())?;
    }

    staged.commit()
}

pub fn write_summary_json<W: Write>(writer: W, summary: &SummaryRecord) -> Result<(), AppError> {
    serde_json::to_writer_pretty(writer, summary)
        .map_err(|e| AppError::new(2, format!("Failed to write summary JSON: {e}")))
}

pub fn format_timestamp(summary: &SummaryRecord) -> String {
    format!("{}\n", summary.generated_at.format("%Y-%m-%d %H:%M:%S"))
}

pub fn write_daily_csv<W: Write>(writer: W, points: &[DailyPoint]) -> Result<(), AppError> {
    write_csv(writer, points, DAILY_FILE)
}

#[derive(Debug, Serialize)]
struct AlignedRow {
    day_of_year: u32,
    cases_a: f64,
    cases_b: f64,
    deaths_a: f64,
    deaths_b: f64,
}

/// One row per aligned day-of-year. Both pairs must share an axis.
pub fn write_aligned_csv<W: Write>(writer: W, cases: &AlignedPair, deaths: &AlignedPair) -> Result<(), AppError> {
    if cases.len() != deaths.len() {
        return Err(AppError::new(
            2,
            format!("Aligned series length mismatch: cases={} deaths={}", cases.len(), deaths.len()),
        ));
    }
    let rows: Vec<AlignedRow> = (1..=cases.len() as u32)
        .filter_map(|day| {
            let (cases_a, cases_b) = cases.day(day)?;
            let (deaths_a, deaths_b) = deaths.day(day)?;
            Some(AlignedRow {
                day_of_year: day,
                cases_a,
                cases_b,
                deaths_a,
                deaths_b,
            })
        })
        .collect();
    write_csv(writer, &rows, ALIGNED_FILE)
}

pub fn write_weekly_csv<W: Write>(writer: W, weeks: &[WeeklyTotal]) -> Result<(), AppError> {
    write_csv(writer, weeks, WEEKLY_FILE)
}

fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T], name: &str) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write {name} row: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush {name}: {e}")))
}
