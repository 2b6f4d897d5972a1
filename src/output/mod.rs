//! Output module for batch reporting
//!
//! Result records themselves are serialized by the caller; this module
//! aggregates them into statistics for the end-of-run summary.

pub mod stats;

pub use stats::{print_statistics, BatchStatistics};
