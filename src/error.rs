//! Error types.
//!
//! The analytics core reports typed errors (`IngestError`, `ComputationError`);
//! the application shell converts them into an `AppError` carrying the process
//! exit code.
//!
//! Exit codes:
//! - `2` configuration, input schema, or filesystem problems
//! - `3` no usable data for the requested country/period
//! - `4` retrieval or rendering failures

use thiserror::Error;

/// Failures while turning raw rows into a usable `RecordStore`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// No usable rows remain for the target country or period.
    #[error("no usable rows for {context}")]
    Empty { context: String },
    /// A single row could not be parsed. Recovered locally by dropping the row.
    #[error("line {line}: {message}")]
    Malformed { line: usize, message: String },
}

impl IngestError {
    pub fn empty(context: impl Into<String>) -> Self {
        IngestError::Empty {
            context: context.into(),
        }
    }
}

/// Typed "no value" outcomes of numeric derivations.
///
/// These are carried as data (`None` in a `DerivedSeries`, `null` in the
/// summary) rather than aborting the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ComputationError {
    #[error("rate undefined: zero denominator")]
    UndefinedRate,
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Empty { .. } => AppError::new(3, err.to_string()),
            IngestError::Malformed { .. } => AppError::new(2, err.to_string()),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ingest_maps_to_exit_code_3() {
        let err: AppError = IngestError::empty("country 'Brazil'").into();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "no usable rows for country 'Brazil'");
    }
}
