//! CLI argument parsing for tvbench

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "tvbench")]
#[command(version)]
#[command(about = "Performance regression harness for pg_tviews", long_about = None)]
pub struct Cli {
    /// Enable debug tracing output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Configuration file (defaults to ./tvbench.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare current timings against the recorded baseline and fail on regression
    Check {
        /// Baseline JSON file
        #[arg(long, value_name = "PATH")]
        baseline: Option<PathBuf>,

        /// Measured iterations per benchmark
        #[arg(long, value_name = "N")]
        iterations: Option<usize>,

        /// Relative slowdown that counts as a regression (0.10 = 10%)
        #[arg(long, value_name = "F")]
        threshold: Option<f64>,

        /// Run DIR/NAME.sql through psql instead of the simulated timings
        #[arg(long = "sql-dir", value_name = "DIR")]
        sql_dir: Option<PathBuf>,

        /// Directory for results-<timestamp>.json
        #[arg(long = "results-dir", value_name = "DIR")]
        results_dir: Option<PathBuf>,

        /// Benchmarks to check (defaults to the configured list)
        #[arg(value_name = "BENCHMARK")]
        benchmarks: Vec<String>,
    },

    /// Execute SQL workloads and write a validation report
    Run {
        /// Measured iterations per workload
        #[arg(long, value_name = "N")]
        iterations: Option<usize>,

        /// Untimed warmup executions per workload
        #[arg(long, value_name = "N")]
        warmup: Option<usize>,

        /// Markdown output path
        #[arg(long, value_name = "PATH", default_value = "PERFORMANCE_VALIDATION.md")]
        output: PathBuf,

        /// Workloads as FILE.sql:IMPLEMENTATION
        #[arg(value_name = "WORKLOAD", required = true, value_parser = parse_workload)]
        workloads: Vec<WorkloadArg>,
    },

    /// Build the comprehensive incremental vs full-refresh report
    Report {
        /// JSON array of raw result rows
        #[arg(long, value_name = "FILE")]
        results: PathBuf,

        /// JSON array of comparison rows (paired from results when omitted)
        #[arg(long, value_name = "FILE")]
        comparisons: Option<PathBuf>,

        /// Directory for BENCHMARK_REPORT_<timestamp>.md
        #[arg(long = "output-dir", value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
}

/// A workload file paired with its implementation label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadArg {
    pub path: PathBuf,
    pub implementation: String,
}

fn parse_workload(value: &str) -> Result<WorkloadArg, String> {
    match value.rsplit_once(':') {
        Some((path, implementation)) if !path.is_empty() && !implementation.is_empty() => {
            Ok(WorkloadArg {
                path: PathBuf::from(path),
                implementation: implementation.to_string(),
            })
        }
        _ => Err(format!("expected FILE.sql:IMPLEMENTATION, got {value:?}")),
    }
}
