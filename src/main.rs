use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::{Path, PathBuf};
use tvbench::aggregate::{pair_comparisons, ComparisonRow, ResultRow};
use tvbench::cli::{Cli, Command, WorkloadArg};
use tvbench::config::HarnessConfig;
use tvbench::json_output::{load_rows, write_results};
use tvbench::regression::{detect_regression, RegressionAssessment, RegressionConfig};
use tvbench::report::{report_file_name, validation_report, write_document, BenchmarkReport};
use tvbench::{
    simulation, stats, Baseline, BenchError, PsqlRunner, Summary, TrialExecutor, WorkloadRunner,
};
use tracing_subscriber::EnvFilter;

/// Initialize the stderr tracing subscriber
///
/// `--debug` enables everything; otherwise `RUST_LOG` applies, defaulting to warn.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn rule() -> String {
    "=".repeat(60)
}

/// Time one benchmark for the regression check
///
/// With a SQL directory the workload `DIR/NAME.sql` runs through psql,
/// otherwise the canned timings are replayed.
fn measure(
    name: &str,
    config: &HarnessConfig,
    executor: &TrialExecutor,
    sql_dir: Option<&Path>,
) -> Result<Summary> {
    let iterations = executor.iterations();
    match sql_dir {
        Some(dir) => {
            let workload = dir.join(format!("{name}.sql"));
            println!("Running benchmark: {name} ({iterations} iterations)...");
            let mut runner =
                PsqlRunner::new(config.runner.psql.clone(), config.runner.database.clone());
            let samples = executor.run_benchmark(
                &mut runner,
                &workload.to_string_lossy(),
                "pg_tviews",
            )?;
            let durations: Vec<f64> = samples.iter().map(|s| s.duration_ms).collect();
            Ok(stats::summarize_durations(name, "pg_tviews", &durations)?)
        }
        None => {
            println!("Simulating benchmark: {name} ({iterations} iterations)...");
            let samples =
                simulation::simulate_samples(name, iterations, &mut rand::thread_rng());
            Ok(stats::summarize(name, &samples)?)
        }
    }
}

fn run_check(
    config: &HarnessConfig,
    baseline_path: PathBuf,
    iterations: usize,
    regression: RegressionConfig,
    sql_dir: Option<PathBuf>,
    results_dir: PathBuf,
    benchmarks: Vec<String>,
) -> Result<i32> {
    regression.validate().map_err(BenchError::Config)?;
    let executor = TrialExecutor::new(iterations, config.runner.warmup)?;
    let started = Local::now();

    println!("=== pg_tviews Performance Regression Testing ===\n");

    let baseline = match Baseline::from_file(&baseline_path) {
        Ok(baseline) => baseline,
        Err(e @ BenchError::BaselineNotFound { .. }) => {
            println!("❌ {e}");
            println!("Run this command from the project root directory or pass --baseline");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    println!("Baseline version: {}", baseline.version);
    println!("Baseline date: {}", baseline.date);
    println!("Hardware: {}", baseline.hardware.cpu);
    println!();

    let entries = benchmarks
        .iter()
        .map(|name| baseline.entry(name))
        .collect::<tvbench::Result<Vec<_>>>()?;

    let mut summaries = Vec::with_capacity(benchmarks.len());
    let mut comparisons = Vec::with_capacity(benchmarks.len());
    for (name, entry) in benchmarks.iter().zip(entries) {
        let summary = measure(name, config, &executor, sql_dir.as_deref())
            .with_context(|| format!("benchmark {name} failed"))?;
        let comparison = detect_regression(entry, &summary, &regression);

        println!("\n{}", comparison.message);
        println!(
            "  Baseline: {:.2}ms ± {:.2}ms",
            comparison.baseline_mean_ms, comparison.baseline_stddev_ms
        );
        println!(
            "  Current:  {:.2}ms ± {:.2}ms",
            comparison.current_mean_ms, comparison.current_stddev_ms
        );

        summaries.push(summary);
        comparisons.push(comparison);
    }
    let assessment = RegressionAssessment::from_comparisons(comparisons, &regression);

    let output_file = write_results(&results_dir, started, &summaries)?;
    println!("\n📊 Results saved to: {}", output_file.display());

    println!();
    print!("{}", assessment.to_report_string());

    Ok(assessment.exit_code())
}

fn run_workloads(
    executor: &TrialExecutor,
    runner: &mut dyn WorkloadRunner,
    workloads: &[WorkloadArg],
    output: &Path,
) -> Result<()> {
    let mut summaries = Vec::with_capacity(workloads.len());
    for workload in workloads {
        let file = workload.path.to_string_lossy();
        println!("Running {} ({})...", file, workload.implementation);
        let result = executor
            .run_benchmark(runner, &file, &workload.implementation)
            .and_then(|samples| stats::summarize(&file, &samples));
        match result {
            Ok(summary) => {
                println!("  Mean: {:.2}ms, Median: {:.2}ms", summary.mean_ms, summary.median_ms);
                summaries.push(summary);
            }
            Err(e) => {
                tracing::error!(workload = %file, error = %e, "workload failed");
                println!("  ✗ {file} failed: {e}");
            }
        }
    }

    if summaries.is_empty() {
        anyhow::bail!("No benchmarks completed");
    }

    let report = validation_report(&summaries, Local::now());
    let path = write_document(output, &report)?;
    println!("\nReport saved to: {}", path.display());
    Ok(())
}

fn run_report(results: &Path, comparisons: Option<&Path>, output_dir: &Path) -> Result<()> {
    let results: Vec<ResultRow> =
        load_rows(results).context("failed to load benchmark results")?;
    if results.is_empty() {
        return Err(BenchError::NoResults.into());
    }

    let comparisons: Vec<ComparisonRow> = match comparisons {
        Some(path) => load_rows(path).context("failed to load comparisons")?,
        None => pair_comparisons(&results),
    };
    println!(
        "Found {} results and {} comparisons",
        results.len(),
        comparisons.len()
    );

    let generated = Local::now();
    let report = BenchmarkReport::build(&results, &comparisons, generated)?.to_markdown();
    let path = write_document(&output_dir.join(report_file_name(&generated)), &report)?;
    println!("Report saved to: {}", path.display());

    println!("\n{}", rule());
    println!("{report}");
    println!("{}", rule());
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let config = HarnessConfig::load(args.config.as_deref())?;
    tracing::debug!(?config, "resolved configuration");

    match args.command {
        Command::Check {
            baseline,
            iterations,
            threshold,
            sql_dir,
            results_dir,
            benchmarks,
        } => {
            let regression = threshold
                .map(RegressionConfig::with_threshold)
                .unwrap_or_else(|| config.regression_config());
            let benchmarks = if benchmarks.is_empty() {
                config.regression.benchmarks.clone()
            } else {
                benchmarks
            };
            let code = run_check(
                &config,
                baseline.unwrap_or_else(|| config.regression.baseline.clone()),
                iterations.unwrap_or(config.runner.iterations),
                regression,
                sql_dir,
                results_dir.unwrap_or_else(|| config.regression.results_dir.clone()),
                benchmarks,
            )?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Command::Run {
            iterations,
            warmup,
            output,
            workloads,
        } => {
            let executor = TrialExecutor::new(
                iterations.unwrap_or(config.runner.iterations),
                warmup.unwrap_or(config.runner.warmup),
            )?;
            let mut runner =
                PsqlRunner::new(config.runner.psql.clone(), config.runner.database.clone());
            run_workloads(&executor, &mut runner, &workloads, &output)?;
        }
        Command::Report {
            results,
            comparisons,
            output_dir,
        } => {
            let output_dir = output_dir.unwrap_or_else(|| config.report.output_dir.clone());
            run_report(&results, comparisons.as_deref(), &output_dir)?;
        }
    }

    Ok(())
}
