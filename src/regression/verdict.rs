// Regression classification and run-level verdict
//
// Classification is a pure function of (baseline mean, current mean,
// threshold). The four categories are checked in a fixed order and the
// first match wins.

use crate::baseline::{Baseline, BaselineEntry};
use crate::error::Result;
use crate::regression::config::{RegressionConfig, IMPROVEMENT_THRESHOLD};
use crate::stats::Summary;
use serde::Serialize;

/// Outcome category of a single comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Classification {
    /// Slower by more than the regression threshold
    Regression,
    /// `percent_change > threshold` without matching `Regression`.
    /// Only reachable at floating-point boundaries; kept in its place so the
    /// branch order is unchanged for consumers of the exit status.
    Warning,
    /// Faster by more than `IMPROVEMENT_THRESHOLD`
    Improvement,
    /// Within acceptable range
    WithinRange,
}

impl Classification {
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Regression => "REGRESSION",
            Classification::Warning => "WARNING",
            Classification::Improvement => "IMPROVEMENT",
            Classification::WithinRange => "OK",
        }
    }
}

/// Classify a relative change against the regression threshold
pub fn classify(percent_change: f64, threshold: f64) -> Classification {
    let exceeds = percent_change.abs() > threshold;

    if exceeds && percent_change > 0.0 {
        Classification::Regression
    } else if percent_change > threshold {
        Classification::Warning
    } else if percent_change < -IMPROVEMENT_THRESHOLD {
        Classification::Improvement
    } else {
        Classification::WithinRange
    }
}

/// `(current - baseline) / baseline`
pub fn percent_change(baseline_mean_ms: f64, current_mean_ms: f64) -> f64 {
    (current_mean_ms - baseline_mean_ms) / baseline_mean_ms
}

/// Baseline-vs-current comparison for one benchmark
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub name: String,
    pub baseline_mean_ms: f64,
    pub baseline_stddev_ms: f64,
    pub current_mean_ms: f64,
    pub current_stddev_ms: f64,
    pub percent_change: f64,
    pub classification: Classification,
    /// True only for `Classification::Regression`
    pub is_regression: bool,
    pub message: String,
}

impl Comparison {
    /// `(is_regression, percent_change, message)`
    pub fn as_triple(&self) -> (bool, f64, &str) {
        (self.is_regression, self.percent_change, &self.message)
    }
}

fn message(name: &str, classification: Classification, change: f64) -> String {
    match classification {
        Classification::Regression => {
            format!("REGRESSION: {} is {:.1}% slower", name, change * 100.0)
        }
        Classification::Warning => format!("WARNING: {} is {:.1}% slower", name, change * 100.0),
        Classification::Improvement => {
            format!("IMPROVEMENT: {} is {:.1}% faster!", name, -change * 100.0)
        }
        Classification::WithinRange => {
            format!("OK: {} performance within acceptable range", name)
        }
    }
}

/// Compare a current summary against its baseline entry
pub fn detect_regression(
    baseline: &BaselineEntry,
    current: &Summary,
    config: &RegressionConfig,
) -> Comparison {
    let change = percent_change(baseline.mean_ms, current.mean_ms);
    let classification = classify(change, config.threshold);
    tracing::debug!(
        name = %current.name,
        baseline_mean_ms = baseline.mean_ms,
        current_mean_ms = current.mean_ms,
        percent_change = change,
        classification = classification.label(),
        "classified benchmark"
    );

    Comparison {
        name: current.name.clone(),
        baseline_mean_ms: baseline.mean_ms,
        baseline_stddev_ms: baseline.stddev_ms,
        current_mean_ms: current.mean_ms,
        current_stddev_ms: current.stddev_ms,
        percent_change: change,
        classification,
        is_regression: classification == Classification::Regression,
        message: message(&current.name, classification, change),
    }
}

/// Final verdict for a regression-check run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegressionVerdict {
    /// No benchmark classified as a regression
    NoRegression,

    /// At least one benchmark regressed
    Regression {
        /// Benchmarks that regressed, in run order
        regressed: Vec<String>,
    },
}

/// Comparisons for every benchmark in a run plus the resulting verdict
#[derive(Debug, Clone)]
pub struct RegressionAssessment {
    pub verdict: RegressionVerdict,
    pub comparisons: Vec<Comparison>,
    pub config: RegressionConfig,
}

impl RegressionAssessment {
    /// Derive the verdict from comparisons already made, in run order
    pub fn from_comparisons(comparisons: Vec<Comparison>, config: &RegressionConfig) -> Self {
        let regressed: Vec<String> = comparisons
            .iter()
            .filter(|c| c.is_regression)
            .map(|c| c.name.clone())
            .collect();

        let verdict = if regressed.is_empty() {
            RegressionVerdict::NoRegression
        } else {
            RegressionVerdict::Regression { regressed }
        };

        Self {
            verdict,
            comparisons,
            config: *config,
        }
    }

    /// Process exit status: 1 when anything regressed, else 0
    pub fn exit_code(&self) -> i32 {
        match self.verdict {
            RegressionVerdict::NoRegression => 0,
            RegressionVerdict::Regression { .. } => 1,
        }
    }

    /// Human-readable summary block
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();
        report.push_str(&"=".repeat(60));
        report.push_str("\nSUMMARY\n");
        report.push_str(&"=".repeat(60));
        report.push('\n');

        match &self.verdict {
            RegressionVerdict::NoRegression => {
                report.push_str("\n✅ All benchmarks passed. No regressions detected.\n");
            }
            RegressionVerdict::Regression { regressed } => {
                report.push_str(&format!(
                    "\n❌ {} REGRESSION(S) DETECTED:\n",
                    regressed.len()
                ));
                for name in regressed {
                    report.push_str(&format!("  - {}\n", name));
                }
                report.push_str("\nFailing CI build due to performance regression.\n");
            }
        }

        report
    }
}

/// Compare each summary with its baseline entry
///
/// A summary whose name has no baseline entry is an error.
pub fn assess_regression(
    baseline: &Baseline,
    summaries: &[Summary],
    config: &RegressionConfig,
) -> Result<RegressionAssessment> {
    let mut comparisons = Vec::with_capacity(summaries.len());
    for summary in summaries {
        let entry = baseline.entry(&summary.name)?;
        comparisons.push(detect_regression(entry, summary, config));
    }
    Ok(RegressionAssessment::from_comparisons(comparisons, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_regression() {
        assert_eq!(classify(0.15, 0.10), Classification::Regression);
    }

    #[test]
    fn test_classify_within_range_small_slowdown() {
        assert_eq!(classify(0.055, 0.10), Classification::WithinRange);
    }

    #[test]
    fn test_classify_improvement_uses_fixed_threshold() {
        assert_eq!(classify(-0.06, 0.10), Classification::Improvement);
        // Regression threshold has no bearing on improvements
        assert_eq!(classify(-0.06, 0.50), Classification::Improvement);
    }

    #[test]
    fn test_large_speedup_is_never_a_regression() {
        let c = classify(-0.9, 0.10);
        assert_eq!(c, Classification::Improvement);
    }

    #[test]
    fn test_exact_threshold_is_not_regression() {
        assert_eq!(classify(0.10, 0.10), Classification::WithinRange);
        assert_eq!(classify(-0.05, 0.10), Classification::WithinRange);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Classification::Regression.label(), "REGRESSION");
        assert_eq!(Classification::Warning.label(), "WARNING");
        assert_eq!(Classification::Improvement.label(), "IMPROVEMENT");
        assert_eq!(Classification::WithinRange.label(), "OK");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            message("bulk_1k_rows", Classification::Regression, 0.153),
            "REGRESSION: bulk_1k_rows is 15.3% slower"
        );
        assert_eq!(
            message("bulk_1k_rows", Classification::Improvement, -0.06),
            "IMPROVEMENT: bulk_1k_rows is 6.0% faster!"
        );
        assert_eq!(
            message("bulk_1k_rows", Classification::WithinRange, 0.01),
            "OK: bulk_1k_rows performance within acceptable range"
        );
    }

    #[test]
    fn test_report_string_no_regression() {
        let assessment = RegressionAssessment {
            verdict: RegressionVerdict::NoRegression,
            comparisons: vec![],
            config: RegressionConfig::default(),
        };
        let report = assessment.to_report_string();
        assert!(report.contains("SUMMARY"));
        assert!(report.contains("No regressions detected"));
        assert_eq!(assessment.exit_code(), 0);
    }

    #[test]
    fn test_report_string_regression() {
        let assessment = RegressionAssessment {
            verdict: RegressionVerdict::Regression {
                regressed: vec!["single_row_update".to_string()],
            },
            comparisons: vec![],
            config: RegressionConfig::default(),
        };
        let report = assessment.to_report_string();
        assert!(report.contains("1 REGRESSION(S) DETECTED"));
        assert!(report.contains("  - single_row_update"));
        assert!(report.contains("Failing CI build"));
        assert_eq!(assessment.exit_code(), 1);
    }
}
