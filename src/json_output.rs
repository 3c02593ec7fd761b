//! JSON persistence for benchmark results
//!
//! `check` records every run as `results-<unix_seconds>.json`; `report`
//! reads result and comparison rows exported as JSON arrays.

use crate::error::{BenchError, Result};
use crate::stats::Summary;
use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One benchmark entry in a results file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonBenchmarkResult {
    pub name: String,
    pub mean_ms: f64,
    pub stddev_ms: f64,
    pub p95_ms: f64,
    pub n: usize,
}

impl From<&Summary> for JsonBenchmarkResult {
    fn from(summary: &Summary) -> Self {
        Self {
            name: summary.name.clone(),
            mean_ms: summary.mean_ms,
            stddev_ms: summary.stddev_ms,
            p95_ms: summary.p95_ms,
            n: summary.n,
        }
    }
}

/// Complete results file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonResultsFile {
    /// Seconds since the Unix epoch, fractional
    pub timestamp: f64,
    /// Local time, `%Y-%m-%d %H:%M:%S`
    pub date: String,
    pub results: Vec<JsonBenchmarkResult>,
}

impl JsonResultsFile {
    pub fn new(started: DateTime<Local>, summaries: &[Summary]) -> Self {
        Self {
            timestamp: started.timestamp_micros() as f64 / 1_000_000.0,
            date: started.format("%Y-%m-%d %H:%M:%S").to_string(),
            results: summaries.iter().map(JsonBenchmarkResult::from).collect(),
        }
    }

    /// `results-<unix_seconds>.json`
    pub fn file_name(&self) -> String {
        format!("results-{}.json", self.timestamp.trunc() as i64)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BenchError::parse(self.file_name(), e))
    }
}

/// Write a results file into `dir` and return its path
pub fn write_results(dir: &Path, started: DateTime<Local>, summaries: &[Summary]) -> Result<PathBuf> {
    let file = JsonResultsFile::new(started, summaries);
    fs::create_dir_all(dir).map_err(|e| BenchError::io(dir, e))?;

    let path = dir.join(file.file_name());
    fs::write(&path, file.to_json()?).map_err(|e| BenchError::io(&path, e))?;
    tracing::info!(path = %path.display(), results = file.results.len(), "saved results");
    Ok(path)
}

/// Load a JSON array of rows
pub fn load_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = fs::read_to_string(path).map_err(|e| BenchError::io(path, e))?;
    let rows: Vec<T> = serde_json::from_str(&content).map_err(|e| BenchError::parse(path, e))?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "loaded rows");
    Ok(rows)
}
