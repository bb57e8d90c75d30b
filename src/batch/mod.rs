//! Benchmark batches: the configuration matrix, per-configuration isolation
//! of failures, and result reporting.

pub mod report;
mod runner;

pub use report::{BatchReport, ConfigOutcome, ConfigReport};
pub use runner::BatchRunner;
