//! Sample reduction: mean, median, stddev, extrema and P95
//!
//! The reducer is pure. The same sample sequence always yields a
//! bit-identical `Summary`; no samples are filtered as outliers.

use crate::error::{BenchError, Result};
use crate::executor::RawSample;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Percentile reported alongside the mean
pub const P95: f64 = 0.95;

/// Reduced description of one (workload, implementation) sample sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub name: String,
    pub implementation: String,
    /// Number of samples (always >= 1)
    pub n: usize,
    pub mean_ms: f64,
    pub median_ms: f64,
    /// Sample standard deviation (n-1 divisor), 0 for a single sample
    pub stddev_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    /// Nearest-rank 95th percentile
    pub p95_ms: f64,
}

/// Reduce the samples of one benchmark run
///
/// Name and implementation are taken from the first sample; `workload`
/// only names the benchmark when there are no samples at all.
pub fn summarize(workload: &str, samples: &[RawSample]) -> Result<Summary> {
    let first = samples.first().ok_or_else(|| BenchError::EmptySamples {
        workload: workload.to_string(),
    })?;
    let durations: Vec<f64> = samples.iter().map(|s| s.duration_ms).collect();
    summarize_durations(&first.name, &first.implementation, &durations)
}

/// Reduce raw durations (milliseconds) into a `Summary`
pub fn summarize_durations(name: &str, implementation: &str, durations: &[f64]) -> Result<Summary> {
    if durations.is_empty() {
        return Err(BenchError::EmptySamples {
            workload: name.to_string(),
        });
    }

    let mut sorted = durations.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let min_ms = sorted[0];
    let max_ms = sorted[sorted.len() - 1];
    // Rounding in the sum can land a hair outside the extrema
    let mean_ms = mean(durations).clamp(min_ms, max_ms);

    let summary = Summary {
        name: name.to_string(),
        implementation: implementation.to_string(),
        n: durations.len(),
        mean_ms,
        median_ms: median(&sorted),
        stddev_ms: sample_stddev(durations, mean_ms),
        min_ms,
        max_ms,
        p95_ms: percentile_nearest_rank(&sorted, P95),
    };
    tracing::debug!(
        name,
        implementation,
        n = summary.n,
        mean_ms = summary.mean_ms,
        p95_ms = summary.p95_ms,
        "summarized samples"
    );
    Ok(summary)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation with Bessel's correction
fn sample_stddev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Median of ascending-sorted data (mean of the middle pair for even lengths)
pub fn median(sorted: &[f64]) -> f64 {
    let len = sorted.len();
    if len == 0 {
        return 0.0;
    }
    let mid = len / 2;
    if len % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Nearest-rank percentile of ascending-sorted data, no interpolation
///
/// Index is `floor(fraction * n)`, clamped to the last element.
pub fn percentile_nearest_rank(sorted: &[f64], fraction: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (fraction * sorted.len() as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}
