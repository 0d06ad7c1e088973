//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw and cleaned daily observations (`RawRow`, `Observation`)
//! - derived outputs (`DerivedSeries`, `AlignedPair`, `WeeklyTotal`)
//! - the persisted summary (`SummaryRecord`) and run configuration

pub mod types;

pub use types::*;
