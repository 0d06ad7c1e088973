//! `epi-dash` library crate.
//!
//! The binary (`epi`) is a thin wrapper around this library so that:
//!
//! - the analytics pipeline is testable without spawning processes or touching the network
//! - I/O shells (retrieval, CSV, charts, artifacts) stay replaceable
//! - code stays easy to navigate as the project grows

pub mod analytics;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod store;
