//! Harness configuration (tvbench.toml)
//!
//! Every key is optional; missing keys fall back to the defaults below.
//! Command-line flags override whatever the file sets.
//!
//! # Example tvbench.toml
//!
//! ```toml
//! [runner]
//! iterations = 20
//! warmup = 3
//! psql = "/usr/lib/postgresql/17/bin/psql"
//! database = "pg_tviews_benchmark"
//!
//! [regression]
//! threshold = 0.10
//! baseline = "test/benchmarks/baseline.json"
//! benchmarks = ["single_row_update", "cascade_10_entities", "bulk_1k_rows"]
//! results_dir = "test/benchmarks"
//!
//! [report]
//! output_dir = "results"
//! ```

use crate::error::{BenchError, Result};
use crate::regression::{RegressionConfig, DEFAULT_REGRESSION_THRESHOLD};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is named
pub const DEFAULT_CONFIG_FILE: &str = "tvbench.toml";

/// Trial executor settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunnerSection {
    pub iterations: usize,
    pub warmup: usize,
    /// psql executable used to run workload files
    pub psql: String,
    pub database: Option<String>,
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            iterations: 10,
            warmup: 2,
            psql: "psql".to_string(),
            database: None,
        }
    }
}

/// Regression check settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegressionSection {
    pub threshold: f64,
    pub baseline: PathBuf,
    pub benchmarks: Vec<String>,
    pub results_dir: PathBuf,
}

impl Default for RegressionSection {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_REGRESSION_THRESHOLD,
            baseline: PathBuf::from("baseline.json"),
            benchmarks: vec![
                "single_row_update".to_string(),
                "cascade_10_entities".to_string(),
                "bulk_1k_rows".to_string(),
            ],
            results_dir: PathBuf::from("."),
        }
    }
}

/// Report output settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub output_dir: PathBuf,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("results"),
        }
    }
}

/// Root of tvbench.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub runner: RunnerSection,
    pub regression: RegressionSection,
    pub report: ReportSection,
}

impl HarnessConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            BenchError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML content
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: HarnessConfig = toml::from_str(content)
            .map_err(|e| BenchError::Config(format!("failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration for a run
    ///
    /// An explicitly named file must exist. Without one, `tvbench.toml` in
    /// the working directory is used when present, defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    tracing::debug!("using {}", DEFAULT_CONFIG_FILE);
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.runner.iterations == 0 {
            return Err(BenchError::Config("runner.iterations must be >= 1".to_string()));
        }
        self.regression_config().validate().map_err(BenchError::Config)
    }

    pub fn regression_config(&self) -> RegressionConfig {
        RegressionConfig::with_threshold(self.regression.threshold)
    }
}
