//! tvbench - performance regression harness for pg_tviews
//!
//! Runs benchmark workloads, reduces their timings to summary statistics,
//! compares them against a recorded baseline to gate CI on regressions, and
//! renders Markdown reports comparing incremental maintenance with full
//! refresh.

pub mod aggregate;
pub mod baseline;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod json_output;
pub mod regression;
pub mod report;
pub mod simulation;
pub mod stats;

pub use baseline::{Baseline, BaselineEntry};
pub use error::{BenchError, Result};
pub use executor::{PsqlRunner, RawSample, TrialExecutor, WorkloadRunner};
pub use stats::{summarize, Summary};
