//! Aggregation of incremental vs full-refresh results for reporting
//!
//! Ratios arrive precomputed on each `ComparisonRow`; nothing here re-derives
//! them. `pair_comparisons` is the upstream join that produces those rows
//! when only raw results are available.

use crate::error::{BenchError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

const INCREMENTAL_SUFFIX: &str = "_incremental";
const FULL_REFRESH_SUFFIX: &str = "_full_refresh";

/// One raw timing row from the benchmark results table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub scenario: String,
    pub test_name: String,
    pub data_scale: String,
    pub operation_type: String,
    pub rows_affected: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cascade_depth: Option<i64>,
    pub execution_time_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ResultRow {
    /// Execution time per affected row, 0 when no rows were affected
    pub fn ms_per_row(&self) -> f64 {
        if self.rows_affected == 0 {
            0.0
        } else {
            self.execution_time_ms / self.rows_affected as f64
        }
    }
}

/// A matched full-refresh / incremental pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub scenario: String,
    pub test_name: String,
    pub data_scale: String,
    pub operation_type: String,
    pub rows_affected: i64,
    /// Full-refresh time
    pub baseline_ms: f64,
    pub incremental_ms: f64,
    /// `baseline_ms / incremental_ms`; above 1 means incremental is faster
    pub improvement_ratio: f64,
    /// `baseline_ms - incremental_ms`
    pub time_saved_ms: f64,
}

/// Ordered workload size tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DataScale {
    Small,
    Medium,
    Large,
}

impl DataScale {
    pub const ALL: [DataScale; 3] = [DataScale::Small, DataScale::Medium, DataScale::Large];

    /// Ordinal rank: small=1, medium=2, large=3
    pub fn rank(&self) -> u8 {
        match self {
            DataScale::Small => 1,
            DataScale::Medium => 2,
            DataScale::Large => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataScale::Small => "small",
            DataScale::Medium => "medium",
            DataScale::Large => "large",
        }
    }
}

impl FromStr for DataScale {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "small" => Ok(DataScale::Small),
            "medium" => Ok(DataScale::Medium),
            "large" => Ok(DataScale::Large),
            other => Err(BenchError::UnknownDataScale(other.to_string())),
        }
    }
}

impl fmt::Display for DataScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation categories matched by substring of `operation_type`
///
/// Matching is by substring, so a `bulk_1000` operation also falls in the
/// `bulk_100` category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationCategory {
    SingleRow,
    Bulk100,
    Bulk1000,
}

impl OperationCategory {
    pub const ALL: [OperationCategory; 3] = [
        OperationCategory::SingleRow,
        OperationCategory::Bulk100,
        OperationCategory::Bulk1000,
    ];

    pub fn pattern(&self) -> &'static str {
        match self {
            OperationCategory::SingleRow => "single_row",
            OperationCategory::Bulk100 => "bulk_100",
            OperationCategory::Bulk1000 => "bulk_1000",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OperationCategory::SingleRow => "Single Row Operations",
            OperationCategory::Bulk100 => "Bulk 100 Row Operations",
            OperationCategory::Bulk1000 => "Bulk 1000 Row Operations",
        }
    }

    pub fn matches(&self, operation_type: &str) -> bool {
        operation_type.contains(self.pattern())
    }
}

/// Aggregate improvement statistics across all comparisons
#[derive(Debug, Clone, PartialEq)]
pub struct ImprovementSummary {
    /// Number of raw result rows
    pub total_tests: usize,
    pub average: f64,
    pub best: f64,
    pub minimum: f64,
}

/// Mean improvement for one operation category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFinding {
    pub category: OperationCategory,
    pub count: usize,
    pub average_improvement: f64,
}

/// Mean improvement and total time saved for one data scale
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleFinding {
    pub scale: DataScale,
    pub count: usize,
    pub average_improvement: f64,
    pub total_time_saved_ms: f64,
}

/// Everything the benchmark report renders, grouped and ordered
#[derive(Debug, Clone)]
pub struct AggregatedReport<'a> {
    pub summary: Option<ImprovementSummary>,
    pub comparisons: &'a [ComparisonRow],
    /// Raw results keyed by (scenario, data_scale), rows in input order
    pub scenarios: BTreeMap<(String, String), Vec<&'a ResultRow>>,
    /// Comparisons keyed by (test_name, operation_type), small to large
    pub scaling: BTreeMap<(String, String), Vec<&'a ComparisonRow>>,
    pub categories: Vec<CategoryFinding>,
    pub scales: Vec<ScaleFinding>,
}

/// Build every grouped view of the report data
///
/// Fails on a comparison whose data scale is not small, medium or large.
pub fn aggregate<'a>(
    results: &'a [ResultRow],
    comparisons: &'a [ComparisonRow],
) -> Result<AggregatedReport<'a>> {
    let report = AggregatedReport {
        summary: improvement_summary(results.len(), comparisons),
        comparisons,
        scenarios: scenario_groups(results),
        scaling: scaling_groups(comparisons)?,
        categories: category_findings(comparisons),
        scales: scale_findings(comparisons),
    };
    tracing::debug!(
        results = results.len(),
        comparisons = comparisons.len(),
        scenario_groups = report.scenarios.len(),
        scaling_groups = report.scaling.len(),
        "aggregated benchmark data"
    );
    Ok(report)
}

fn mean_ratio<'a, I>(rows: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = &'a ComparisonRow>,
{
    let (count, sum) = rows
        .into_iter()
        .fold((0usize, 0.0f64), |(n, s), c| (n + 1, s + c.improvement_ratio));
    if count == 0 {
        None
    } else {
        Some((count, sum / count as f64))
    }
}

/// Mean, max and min improvement ratio; `None` without comparisons
pub fn improvement_summary(
    total_tests: usize,
    comparisons: &[ComparisonRow],
) -> Option<ImprovementSummary> {
    let (_, average) = mean_ratio(comparisons)?;
    let best = comparisons
        .iter()
        .map(|c| c.improvement_ratio)
        .fold(f64::NEG_INFINITY, f64::max);
    let minimum = comparisons
        .iter()
        .map(|c| c.improvement_ratio)
        .fold(f64::INFINITY, f64::min);
    Some(ImprovementSummary {
        total_tests,
        average,
        best,
        minimum,
    })
}

/// Group raw results by (scenario, data_scale)
pub fn scenario_groups(results: &[ResultRow]) -> BTreeMap<(String, String), Vec<&ResultRow>> {
    let mut groups: BTreeMap<(String, String), Vec<&ResultRow>> = BTreeMap::new();
    for row in results {
        groups
            .entry((row.scenario.clone(), row.data_scale.clone()))
            .or_default()
            .push(row);
    }
    groups
}

/// Group comparisons by (test_name, operation_type), each sorted by scale rank
pub fn scaling_groups(
    comparisons: &[ComparisonRow],
) -> Result<BTreeMap<(String, String), Vec<&ComparisonRow>>> {
    let mut groups: BTreeMap<(String, String), Vec<(u8, &ComparisonRow)>> = BTreeMap::new();
    for row in comparisons {
        let rank = row.data_scale.parse::<DataScale>()?.rank();
        groups
            .entry((row.test_name.clone(), row.operation_type.clone()))
            .or_default()
            .push((rank, row));
    }

    Ok(groups
        .into_iter()
        .map(|(key, mut rows)| {
            rows.sort_by_key(|(rank, _)| *rank);
            (key, rows.into_iter().map(|(_, row)| row).collect())
        })
        .collect())
}

/// Mean improvement per operation category, skipping empty categories
pub fn category_findings(comparisons: &[ComparisonRow]) -> Vec<CategoryFinding> {
    OperationCategory::ALL
        .iter()
        .filter_map(|&category| {
            let matching = comparisons
                .iter()
                .filter(|c| category.matches(&c.operation_type));
            mean_ratio(matching).map(|(count, average_improvement)| CategoryFinding {
                category,
                count,
                average_improvement,
            })
        })
        .collect()
}

/// Mean improvement and total time saved per exact data scale
pub fn scale_findings(comparisons: &[ComparisonRow]) -> Vec<ScaleFinding> {
    DataScale::ALL
        .iter()
        .filter_map(|&scale| {
            let matching: Vec<&ComparisonRow> = comparisons
                .iter()
                .filter(|c| c.data_scale == scale.as_str())
                .collect();
            let (count, average_improvement) = mean_ratio(matching.iter().copied())?;
            Some(ScaleFinding {
                scale,
                count,
                average_improvement,
                total_time_saved_ms: matching.iter().map(|c| c.time_saved_ms).sum(),
            })
        })
        .collect()
}

/// Join incremental rows with their full-refresh counterparts
///
/// Pairs on (scenario, test_name, data_scale) with `_incremental` swapped for
/// `_full_refresh` in the operation type. Unmatched rows and rows with a
/// non-positive incremental time are dropped. Output is ordered by
/// improvement ratio, highest first.
pub fn pair_comparisons(results: &[ResultRow]) -> Vec<ComparisonRow> {
    let full_refresh: HashMap<(&str, &str, &str, &str), &ResultRow> = results
        .iter()
        .filter(|r| r.operation_type.ends_with(FULL_REFRESH_SUFFIX))
        .map(|r| {
            (
                (
                    r.scenario.as_str(),
                    r.test_name.as_str(),
                    r.data_scale.as_str(),
                    r.operation_type.as_str(),
                ),
                r,
            )
        })
        .collect();

    let mut comparisons: Vec<ComparisonRow> = results
        .iter()
        .filter_map(|inc| {
            let stem = inc.operation_type.strip_suffix(INCREMENTAL_SUFFIX)?;
            let full_op = format!("{stem}{FULL_REFRESH_SUFFIX}");
            let full = full_refresh.get(&(
                inc.scenario.as_str(),
                inc.test_name.as_str(),
                inc.data_scale.as_str(),
                full_op.as_str(),
            ))?;
            if inc.execution_time_ms <= 0.0 {
                return None;
            }
            Some(ComparisonRow {
                scenario: inc.scenario.clone(),
                test_name: inc.test_name.clone(),
                data_scale: inc.data_scale.clone(),
                operation_type: inc.operation_type.clone(),
                rows_affected: inc.rows_affected,
                baseline_ms: full.execution_time_ms,
                incremental_ms: inc.execution_time_ms,
                improvement_ratio: full.execution_time_ms / inc.execution_time_ms,
                time_saved_ms: full.execution_time_ms - inc.execution_time_ms,
            })
        })
        .collect();

    comparisons.sort_by(|a, b| b.improvement_ratio.total_cmp(&a.improvement_ratio));
    tracing::debug!(
        results = results.len(),
        pairs = comparisons.len(),
        "paired incremental and full-refresh results"
    );
    comparisons
}
