//! Recorded baseline loading
//!
//! A baseline is read once per run and treated as read-only ground truth.
//!
//! ```json
//! {
//!   "version": "0.1.0",
//!   "date": "2025-12-01",
//!   "hardware": { "cpu": "AMD Ryzen 9 7950X" },
//!   "benchmarks": {
//!     "single_row_update": { "mean_ms": 2.0, "stddev_ms": 0.1 }
//!   }
//! }
//! ```

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Machine the baseline was recorded on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareInfo {
    pub cpu: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Reference summary for one benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineEntry {
    pub mean_ms: f64,
    pub stddev_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p95_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<usize>,
}

/// Named, versioned, dated set of reference summaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub version: String,
    pub date: String,
    pub hardware: HardwareInfo,
    pub benchmarks: BTreeMap<String, BaselineEntry>,
}

impl Baseline {
    /// Load a baseline file; a missing file is `BenchError::BaselineNotFound`
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BenchError::BaselineNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(BenchError::io(path, e)),
        };
        let baseline: Baseline =
            serde_json::from_str(&content).map_err(|e| BenchError::parse(path, e))?;
        tracing::info!(
            path = %path.display(),
            version = %baseline.version,
            benchmarks = baseline.benchmarks.len(),
            "loaded baseline"
        );
        Ok(baseline)
    }

    /// Parse a baseline from a JSON string
    pub fn from_json_str(content: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Reference entry for `name`
    ///
    /// The entry's mean must be finite and positive, since every comparison
    /// divides by it.
    pub fn entry(&self, name: &str) -> Result<&BaselineEntry> {
        let entry = self
            .benchmarks
            .get(name)
            .ok_or_else(|| BenchError::MissingBaseline {
                benchmark: name.to_string(),
            })?;
        if !entry.mean_ms.is_finite() || entry.mean_ms <= 0.0 {
            return Err(BenchError::InvalidBaseline {
                benchmark: name.to_string(),
                mean_ms: entry.mean_ms,
            });
        }
        Ok(entry)
    }
}
