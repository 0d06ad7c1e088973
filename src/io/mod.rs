//! Input/output shells around the analytics core.
//!
//! - source retrieval over HTTP (`fetch`)
//! - CSV ingest into raw rows (`ingest`)
//! - artifact writing (`export`)

pub mod export;
pub mod fetch;
pub mod ingest;

pub use export::*;
pub use fetch::*;
pub use ingest::*;
