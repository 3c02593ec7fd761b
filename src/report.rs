//! Markdown report generation
//!
//! Two documents: the comprehensive incremental-vs-full-refresh report and
//! the per-benchmark validation report written by `tvbench run`. Section
//! order is fixed. Findings interpolate computed numbers into fixed prose and
//! the recommendations never depend on the data.

use crate::aggregate::{aggregate, AggregatedReport, ComparisonRow, ResultRow};
use crate::error::{BenchError, Result};
use crate::stats::Summary;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

const NOTES_MAX_CHARS: usize = 50;

const RECOMMENDATIONS: &str = "\
## Recommendations

Based on benchmark results:

✅ **Use pg_tviews for:**
- Single row updates (significant improvement even on small datasets)
- Medium-size bulk operations (100-1000 rows)
- Frequently updated views with cascade dependencies
- Real-time applications requiring immediate consistency

⚠️ **Consider alternatives when:**
- Full table refreshes are infrequent (hourly/daily)
- Batch updates affect >50% of rows
- Write throughput >10K rows/second sustained
";

/// Comprehensive benchmark report over raw results and paired comparisons
#[derive(Debug)]
pub struct BenchmarkReport<'a> {
    generated: DateTime<Local>,
    data: AggregatedReport<'a>,
}

impl<'a> BenchmarkReport<'a> {
    /// Aggregate the inputs; fails on an unknown data scale
    pub fn build(
        results: &'a [ResultRow],
        comparisons: &'a [ComparisonRow],
        generated: DateTime<Local>,
    ) -> Result<Self> {
        Ok(Self {
            generated,
            data: aggregate(results, comparisons)?,
        })
    }

    /// Render the whole document
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str("# pg_tviews Comprehensive Benchmark Report\n\n");
        out.push_str(&format!(
            "**Generated:** {}\n\n",
            self.generated.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str("---\n\n");

        self.render_summary(&mut out);
        self.render_comparison_table(&mut out);
        self.render_scenarios(&mut out);
        self.render_scaling(&mut out);
        self.render_findings(&mut out);
        out.push_str(RECOMMENDATIONS);

        out
    }

    fn render_summary(&self, out: &mut String) {
        out.push_str("## Executive Summary\n\n");
        if let Some(summary) = &self.data.summary {
            out.push_str(&format!("**Total Tests Run:** {}\n", summary.total_tests));
            out.push_str(&format!(
                "**Average Improvement:** {:.2}× faster\n",
                summary.average
            ));
            out.push_str(&format!("**Best Improvement:** {:.2}× faster\n", summary.best));
            out.push_str(&format!(
                "**Minimum Improvement:** {:.2}× faster\n\n",
                summary.minimum
            ));
        }
    }

    fn render_comparison_table(&self, out: &mut String) {
        out.push_str("## Performance Comparison: Incremental vs Full Refresh\n\n");
        out.push_str("| Scenario | Test | Scale | Operation | Rows | Full Refresh (ms) | Incremental (ms) | Improvement | Time Saved (ms) |\n");
        out.push_str("|----------|------|-------|-----------|------|-------------------|------------------|-------------|-----------------|\n");

        for comp in self.data.comparisons {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {:.2} | {:.2} | **{:.2}×** | {:.2} |\n",
                comp.scenario,
                comp.test_name,
                comp.data_scale,
                comp.operation_type.replace("_incremental", ""),
                group_thousands(comp.rows_affected),
                comp.baseline_ms,
                comp.incremental_ms,
                comp.improvement_ratio,
                comp.time_saved_ms
            ));
        }
        out.push('\n');
    }

    fn render_scenarios(&self, out: &mut String) {
        out.push_str("## Detailed Results by Scenario\n\n");

        for ((scenario, scale), tests) in &self.data.scenarios {
            out.push_str(&format!(
                "### {} - {} Scale\n\n",
                title_case(scenario),
                title_case(scale)
            ));
            out.push_str("| Test Name | Operation | Rows | Time (ms) | ms/row | Notes |\n");
            out.push_str("|-----------|-----------|------|-----------|--------|-------|\n");

            for test in tests {
                out.push_str(&format!(
                    "| {} | {} | {} | {:.3} | {:.3} | {} |\n",
                    test.test_name,
                    test.operation_type,
                    group_thousands(test.rows_affected),
                    test.execution_time_ms,
                    test.ms_per_row(),
                    truncate_notes(test.notes.as_deref())
                ));
            }
            out.push('\n');
        }
    }

    fn render_scaling(&self, out: &mut String) {
        out.push_str("## Scaling Analysis\n\n");
        out.push_str("### How Performance Scales with Data Size\n\n");

        for ((test_name, op_type), tests) in &self.data.scaling {
            out.push_str(&format!(
                "#### {} - {}\n\n",
                title_case(&test_name.replace('_', " ")),
                title_case(&op_type.replace('_', " "))
            ));
            out.push_str(
                "| Data Scale | Rows Affected | Full Refresh (ms) | Incremental (ms) | Improvement |\n",
            );
            out.push_str(
                "|------------|---------------|-------------------|------------------|-------------|\n",
            );

            for test in tests {
                out.push_str(&format!(
                    "| {} | {} | {:.2} | {:.2} | **{:.2}×** |\n",
                    test.data_scale,
                    group_thousands(test.rows_affected),
                    test.baseline_ms,
                    test.incremental_ms,
                    test.improvement_ratio
                ));
            }
            out.push('\n');
        }
    }

    fn render_findings(&self, out: &mut String) {
        out.push_str("## Key Findings\n\n");

        for finding in &self.data.categories {
            out.push_str(&format!(
                "- **{}:** Average {:.2}× improvement\n",
                finding.category.label(),
                finding.average_improvement
            ));
        }
        out.push('\n');

        for finding in &self.data.scales {
            out.push_str(&format!(
                "- **{} Scale:** Average {:.2}× improvement, {:.2}ms total time saved\n",
                title_case(finding.scale.as_str()),
                finding.average_improvement,
                finding.total_time_saved_ms
            ));
        }
        out.push('\n');
    }
}

/// Validation report for summaries produced by the trial executor
pub fn validation_report(stats: &[Summary], generated: DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str("# pg_tviews Performance Validation Report\n\n");
    out.push_str(&format!(
        "Generated: {}\n\n",
        generated.format("%Y-%m-%dT%H:%M:%S%.6f")
    ));
    out.push_str("## Benchmark Results\n\n");

    for stat in stats {
        out.push_str(&format!("### {} ({})\n\n", stat.name, stat.implementation));
        out.push_str(&format!("- **Mean**: {:.2}ms\n", stat.mean_ms));
        out.push_str(&format!("- **Median**: {:.2}ms\n", stat.median_ms));
        out.push_str(&format!("- **Std Dev**: {:.2}ms\n", stat.stddev_ms));
        out.push_str(&format!("- **Min**: {:.2}ms\n", stat.min_ms));
        out.push_str(&format!("- **Max**: {:.2}ms\n", stat.max_ms));
        out.push_str(&format!("- **Sample Size**: {}\n\n", stat.n));
    }
    out
}

/// `BENCHMARK_REPORT_<YYYYMMDD_HHMMSS>.md`
pub fn report_file_name(generated: &DateTime<Local>) -> String {
    format!(
        "BENCHMARK_REPORT_{}.md",
        generated.format("%Y%m%d_%H%M%S")
    )
}

/// Write a rendered document, creating the parent directory when needed
pub fn write_document(path: &Path, content: &str) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| BenchError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| BenchError::io(path, e))?;
    tracing::info!(path = %path.display(), bytes = content.len(), "wrote report");
    Ok(path.to_path_buf())
}

/// Title-case like Python's `str.title`: a letter is upper-cased when it
/// follows a non-letter, lower-cased otherwise
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Integer with comma thousands separators
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

fn truncate_notes(notes: Option<&str>) -> String {
    match notes {
        Some(text) if text.chars().count() > NOTES_MAX_CHARS => {
            let head: String = text.chars().take(NOTES_MAX_CHARS).collect();
            format!("{head}...")
        }
        Some(text) => text.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn generated() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 12, 1, 14, 30, 5).unwrap()
    }

    fn result(scenario: &str, scale: &str, op: &str, rows: i64, ms: f64) -> ResultRow {
        ResultRow {
            scenario: scenario.to_string(),
            test_name: "order_update".to_string(),
            data_scale: scale.to_string(),
            operation_type: op.to_string(),
            rows_affected: rows,
            cascade_depth: Some(1),
            execution_time_ms: ms,
            notes: None,
        }
    }

    fn comparison(scale: &str, op: &str, ratio: f64) -> ComparisonRow {
        ComparisonRow {
            scenario: "ecommerce".to_string(),
            test_name: "order_update".to_string(),
            data_scale: scale.to_string(),
            operation_type: op.to_string(),
            rows_affected: 1500,
            baseline_ms: 10.0 * ratio,
            incremental_ms: 10.0,
            improvement_ratio: ratio,
            time_saved_ms: 10.0 * ratio - 10.0,
        }
    }

    #[test]
    fn test_title_case_matches_python() {
        assert_eq!(title_case("ecommerce"), "Ecommerce");
        assert_eq!(title_case("single row incremental"), "Single Row Incremental");
        assert_eq!(title_case("bulk_1k rows"), "Bulk_1K Rows");
        assert_eq!(title_case("LARGE"), "Large");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(-45000), "-45,000");
    }

    #[test]
    fn test_truncate_notes() {
        assert_eq!(truncate_notes(None), "");
        assert_eq!(truncate_notes(Some("short")), "short");
        let long = "x".repeat(60);
        let truncated = truncate_notes(Some(&long));
        assert_eq!(truncated.len(), 53);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let results = vec![result("ecommerce", "small", "single_row_incremental", 1, 2.0)];
        let comps = vec![comparison("small", "single_row_incremental", 5.0)];
        let report = BenchmarkReport::build(&results, &comps, generated())
            .unwrap()
            .to_markdown();

        let order = [
            "# pg_tviews Comprehensive Benchmark Report",
            "**Generated:** 2025-12-01 14:30:05",
            "## Executive Summary",
            "## Performance Comparison: Incremental vs Full Refresh",
            "## Detailed Results by Scenario",
            "## Scaling Analysis",
            "## Key Findings",
            "## Recommendations",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|s| report.find(s).unwrap_or_else(|| panic!("missing {s}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_comparison_table_row_format() {
        let comps = vec![comparison("medium", "bulk_100_incremental", 12.5)];
        let report = BenchmarkReport::build(&[], &comps, generated())
            .unwrap()
            .to_markdown();
        assert!(report.contains(
            "| ecommerce | order_update | medium | bulk_100 | 1,500 | 125.00 | 10.00 | **12.50×** | 115.00 |"
        ));
    }

    #[test]
    fn test_summary_omitted_without_comparisons() {
        let results = vec![result("ecommerce", "small", "single_row_incremental", 1, 2.0)];
        let report = BenchmarkReport::build(&results, &[], generated())
            .unwrap()
            .to_markdown();
        assert!(report.contains("## Executive Summary"));
        assert!(!report.contains("**Total Tests Run:**"));
        // Recommendations are unconditional
        assert!(report.contains("Write throughput >10K rows/second sustained"));
    }

    #[test]
    fn test_scenario_detail_rows() {
        let results = vec![
            result("ecommerce", "small", "single_row_incremental", 4, 2.0),
            result("ecommerce", "small", "single_row_full_refresh", 0, 50.0),
        ];
        let report = BenchmarkReport::build(&results, &[], generated())
            .unwrap()
            .to_markdown();
        assert!(report.contains("### Ecommerce - Small Scale"));
        assert!(report.contains("| order_update | single_row_incremental | 4 | 2.000 | 0.500 |  |"));
        assert!(report.contains("| order_update | single_row_full_refresh | 0 | 50.000 | 0.000 |  |"));
    }

    #[test]
    fn test_scaling_section_orders_by_scale() {
        let comps = vec![
            comparison("large", "single_row_incremental", 40.0),
            comparison("small", "single_row_incremental", 4.0),
        ];
        let report = BenchmarkReport::build(&[], &comps, generated())
            .unwrap()
            .to_markdown();
        assert!(report.contains("#### Order Update - Single Row Incremental"));
        let small = report.find("| small | 1,500 |").unwrap();
        let large = report.find("| large | 1,500 |").unwrap();
        assert!(small < large);
    }

    #[test]
    fn test_findings_lines() {
        let comps = vec![
            comparison("small", "single_row_incremental", 4.0),
            comparison("large", "bulk_1000_incremental", 8.0),
        ];
        let report = BenchmarkReport::build(&[], &comps, generated())
            .unwrap()
            .to_markdown();
        assert!(report.contains("- **Single Row Operations:** Average 4.00× improvement"));
        assert!(report.contains("- **Bulk 100 Row Operations:** Average 8.00× improvement"));
        assert!(report.contains("- **Bulk 1000 Row Operations:** Average 8.00× improvement"));
        assert!(report.contains("- **Small Scale:** Average 4.00× improvement, 30.00ms total time saved"));
        assert!(report.contains("- **Large Scale:** Average 8.00× improvement, 70.00ms total time saved"));
        assert!(!report.contains("**Medium Scale:**"));
    }

    #[test]
    fn test_unknown_scale_fails_build() {
        let comps = vec![comparison("enormous", "single_row_incremental", 4.0)];
        assert!(BenchmarkReport::build(&[], &comps, generated()).is_err());
    }

    #[test]
    fn test_validation_report() {
        let stats = vec![crate::stats::summarize_durations(
            "single_row_update_pg_tviews.sql",
            "pg_tviews",
            &[2.0, 4.0],
        )
        .unwrap()];
        let report = validation_report(&stats, generated());
        assert!(report.starts_with("# pg_tviews Performance Validation Report"));
        assert!(report.contains("Generated: 2025-12-01T14:30:05.000000"));
        assert!(report.contains("### single_row_update_pg_tviews.sql (pg_tviews)"));
        assert!(report.contains("- **Mean**: 3.00ms"));
        assert!(report.contains("- **Median**: 3.00ms"));
        assert!(report.contains("- **Sample Size**: 2"));
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name(&generated()),
            "BENCHMARK_REPORT_20251201_143005.md"
        );
    }

    #[test]
    fn test_write_document_creates_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("results").join("report.md");
        write_document(&path, "# hi\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# hi\n");
    }
}
