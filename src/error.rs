//! Error taxonomy for the benchmark pipeline
//!
//! Every failure here is terminal for the run. A detected regression is not
//! an error and never flows through this type.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while configuring, executing or reporting benchmarks
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Baseline file not found: {}", path.display())]
    BaselineNotFound { path: PathBuf },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Workload {workload} failed ({status}): {stderr}")]
    Execution {
        workload: String,
        status: String,
        stderr: String,
    },

    #[error("No samples recorded for {workload}")]
    EmptySamples { workload: String },

    #[error("Benchmark {benchmark} has no entry in the baseline")]
    MissingBaseline { benchmark: String },

    #[error("Baseline mean for {benchmark} must be a positive number, got {mean_ms}")]
    InvalidBaseline { benchmark: String, mean_ms: f64 },

    #[error("Unknown data scale: {0:?} (expected small, medium or large)")]
    UnknownDataScale(String),

    #[error("No benchmark results found. Run benchmarks first.")]
    NoResults,
}

impl BenchError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BenchError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        BenchError::Parse {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_not_found_names_path() {
        let err = BenchError::BaselineNotFound {
            path: PathBuf::from("baseline.json"),
        };
        assert_eq!(err.to_string(), "Baseline file not found: baseline.json");
    }

    #[test]
    fn test_execution_error_carries_stderr() {
        let err = BenchError::Execution {
            workload: "bulk.sql".to_string(),
            status: "exit status: 3".to_string(),
            stderr: "relation does not exist".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bulk.sql"));
        assert!(msg.contains("relation does not exist"));
    }

    #[test]
    fn test_invalid_baseline_names_benchmark() {
        let err = BenchError::InvalidBaseline {
            benchmark: "single_row_update".to_string(),
            mean_ms: 0.0,
        };
        assert_eq!(
            err.to_string(),
            "Baseline mean for single_row_update must be a positive number, got 0"
        );
    }

    #[test]
    fn test_unknown_scale_is_quoted() {
        let err = BenchError::UnknownDataScale("huge".to_string());
        assert!(err.to_string().contains("\"huge\""));
    }
}
