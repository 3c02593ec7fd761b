// Threshold-based performance regression detection
//
// A benchmark regresses when its mean is more than `threshold` (default 10%)
// slower than the recorded baseline mean. Speedups beyond a fixed 5% are
// reported as improvements. This is a fixed relative comparison, not a
// significance test, and existing baselines depend on exactly these
// pass/fail outcomes.

mod config;
mod verdict;

pub use config::{RegressionConfig, DEFAULT_REGRESSION_THRESHOLD, IMPROVEMENT_THRESHOLD};
pub use verdict::{
    assess_regression, classify, detect_regression, percent_change, Classification, Comparison,
    RegressionAssessment, RegressionVerdict,
};
