//! CSV ingest.
//!
//! This module turns the WHO-style daily CSV into `RawRow`s. It does not
//! apply the cleaning policy; `RecordStore::build` drops incomplete rows.
//!
//! Design goals:
//! - **Strict schema** for required headers (clear errors + exit code 2)
//! - **Row-level validation** (a bad cell leaves its field empty and is reported)
//! - **Separation of concerns**: no analytics here

use std::collections::HashMap;
use std::io::Read;

use chrono::NaiveDate;
use csv::StringRecord;
use log::{debug, info, warn};

use crate::domain::RawRow;
use crate::error::{AppError, IngestError};

const COL_DATE: &str = "date_reported";
const COL_COUNTRY: &str = "country";
const COL_CASES: &str = "new_cases";
const COL_DEATHS: &str = "new_deaths";

/// Parsed rows plus the per-cell problems found along the way.
#[derive(Debug, Clone, Default)]
pub struct IngestedRows {
    pub rows: Vec<RawRow>,
    /// Always `IngestError::Malformed`; the affected rows are dropped later.
    pub row_errors: Vec<IngestError>,
}

/// Parse CSV rows from any reader.
pub fn read_rows<R: Read>(reader: R) -> Result<IngestedRows, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let columns = Columns::resolve(&headers)?;

    let mut out = IngestedRows::default();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header, and lines are 1-based.
        let line = idx + 2;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.row_errors.push(IngestError::Malformed {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        out.rows.push(parse_row(&record, &columns, line, &mut out.row_errors));
    }

    for err in &out.row_errors {
        debug!("{err}");
    }
    if !out.row_errors.is_empty() {
        warn!("{} malformed cell(s) in source CSV", out.row_errors.len());
    }
    info!("Read {} row(s) from source CSV", out.rows.len());

    Ok(out)
}

/// Column positions of the required fields.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    country: usize,
    cases: usize,
    deaths: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Result<Self, AppError> {
        let map: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (normalize_header_name(name), idx))
            .collect();

        let get = |name: &str| -> Result<usize, AppError> {
            map.get(name)
                .copied()
                .ok_or_else(|| AppError::new(2, format!("Missing required column: `{name}`")))
        };

        Ok(Self {
            date: get(COL_DATE)?,
            country: get(COL_COUNTRY)?,
            cases: get(COL_CASES)?,
            deaths: get(COL_DEATHS)?,
        })
    }
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_row(record: &StringRecord, columns: &Columns, line: usize, errors: &mut Vec<IngestError>) -> RawRow {
    let mut note = |message: String| errors.push(IngestError::Malformed { line, message });

    let date = get_cell(record, columns.date).and_then(|s| match parse_date(s) {
        Ok(d) => Some(d),
        Err(e) => {
            note(e);
            None
        }
    });
    let mut count = |s: Option<&str>, name: &str| {
        s.and_then(|s| match parse_count(s) {
            Ok(v) => Some(v),
            Err(e) => {
                note(format!("`{name}`: {e}"));
                None
            }
        })
    };
    let new_cases = count(get_cell(record, columns.cases), "New_cases");
    let new_deaths = count(get_cell(record, columns.deaths), "New_deaths");

    RawRow {
        line,
        date,
        country: get_cell(record, columns.country).map(str::to_string),
        new_cases,
        new_deaths,
    }
}

fn get_cell(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a report date.
///
/// ISO dates are the norm, but a datetime suffix (`2024-01-05T00:00:00Z`) and
/// a couple of regional formats show up in mirrors of the data.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];
    let head = s.split(['T', ' ']).next().unwrap_or(s);
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(head, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY."
    ))
}

/// Parse a non-negative daily count. Integral floats (`"12.0"`) are accepted.
pub fn parse_count(s: &str) -> Result<u64, String> {
    if let Ok(v) = s.parse::<u64>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => Ok(v as u64),
        Ok(v) if v < 0.0 => Err(format!("negative count '{s}'")),
        _ => Err(format!("invalid count '{s}'")),
    }
}
