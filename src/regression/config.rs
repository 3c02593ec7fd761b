// Configuration for threshold-based regression detection
//
// The regression threshold is configurable; the improvement threshold is
// fixed at 5%.

use serde::{Deserialize, Serialize};

/// Relative slowdown above which a benchmark is a regression (10%)
pub const DEFAULT_REGRESSION_THRESHOLD: f64 = 0.10;

/// Relative speedup beyond which a benchmark is reported as an improvement
pub const IMPROVEMENT_THRESHOLD: f64 = 0.05;

/// Configuration for regression detection
///
/// # Example
/// ```
/// use tvbench::regression::RegressionConfig;
///
/// let config = RegressionConfig::default();
/// assert_eq!(config.threshold, 0.10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionConfig {
    /// Relative change `(current - baseline) / baseline` that must be
    /// exceeded before a slowdown counts as a regression
    pub threshold: f64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_REGRESSION_THRESHOLD,
        }
    }
}

impl RegressionConfig {
    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(format!(
                "threshold must be a non-negative number, got {}",
                self.threshold
            ));
        }
        Ok(())
    }
}
