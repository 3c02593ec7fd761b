//! Trial execution: warmup, then timed runs of one workload
//!
//! Trials run strictly one after another. The recorded duration is the
//! wall-clock span of a single blocking `WorkloadRunner::execute` call, so
//! nothing else may run concurrently with a measurement.

use crate::error::{BenchError, Result};
use std::process::Command;
use std::time::Instant;

/// One measured trial
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    /// Workload identifier (e.g. the SQL file that was run)
    pub name: String,
    /// Implementation label (e.g. "traditional", "pg_tviews")
    pub implementation: String,
    /// Wall-clock duration in milliseconds
    pub duration_ms: f64,
    /// 0-based index among the measured iterations
    pub iteration: usize,
}

/// External facility that executes a workload once
///
/// Implementations block until the workload has finished. Errors are
/// returned untranslated to the executor, which aborts the benchmark.
pub trait WorkloadRunner {
    fn execute(&mut self, workload: &str) -> Result<()>;
}

/// Runs a SQL file through `psql` in quiet, non-interactive mode
#[derive(Debug, Clone)]
pub struct PsqlRunner {
    program: String,
    database: Option<String>,
}

impl PsqlRunner {
    pub fn new(program: impl Into<String>, database: Option<String>) -> Self {
        Self {
            program: program.into(),
            database,
        }
    }

    fn command(&self, workload: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(db) = &self.database {
            cmd.arg("-d").arg(db);
        }
        cmd.arg("-f").arg(workload).arg("-q");
        cmd
    }
}

impl Default for PsqlRunner {
    fn default() -> Self {
        Self::new("psql", None)
    }
}

impl WorkloadRunner for PsqlRunner {
    fn execute(&mut self, workload: &str) -> Result<()> {
        let output = self
            .command(workload)
            .output()
            .map_err(|source| BenchError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(BenchError::Execution {
                workload: workload.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Executes a workload `warmup` times untimed, then `iterations` times timed
#[derive(Debug, Clone, Copy)]
pub struct TrialExecutor {
    iterations: usize,
    warmup: usize,
}

impl TrialExecutor {
    /// Create an executor; `iterations` must be at least 1
    pub fn new(iterations: usize, warmup: usize) -> Result<Self> {
        if iterations == 0 {
            return Err(BenchError::Config("iterations must be >= 1".to_string()));
        }
        Ok(Self { iterations, warmup })
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn warmup(&self) -> usize {
        self.warmup
    }

    /// Run one benchmark and return its samples in execution order
    ///
    /// The first failing execution, warmup or measured, aborts the whole
    /// benchmark and its error is returned as-is. No samples are salvaged.
    pub fn run_benchmark<R: WorkloadRunner + ?Sized>(
        &self,
        runner: &mut R,
        workload: &str,
        implementation: &str,
    ) -> Result<Vec<RawSample>> {
        tracing::info!(workload, implementation, warmup = self.warmup, "warming up");
        for _ in 0..self.warmup {
            runner.execute(workload)?;
        }

        tracing::info!(
            workload,
            implementation,
            iterations = self.iterations,
            "running measured iterations"
        );
        let mut samples = Vec::with_capacity(self.iterations);
        for iteration in 0..self.iterations {
            let duration_ms = time_execution(runner, workload)?;
            tracing::trace!(workload, iteration, duration_ms, "trial complete");
            samples.push(RawSample {
                name: workload.to_string(),
                implementation: implementation.to_string(),
                duration_ms,
                iteration,
            });
        }
        Ok(samples)
    }
}

fn time_execution<R: WorkloadRunner + ?Sized>(runner: &mut R, workload: &str) -> Result<f64> {
    let start = Instant::now();
    runner.execute(workload)?;
    Ok(start.elapsed().as_secs_f64() * 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts calls and fails on a chosen call number (1-based)
    struct FakeRunner {
        calls: usize,
        fail_on: Option<usize>,
        seen: Vec<String>,
    }

    impl FakeRunner {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                calls: 0,
                fail_on,
                seen: Vec::new(),
            }
        }
    }

    impl WorkloadRunner for FakeRunner {
        fn execute(&mut self, workload: &str) -> Result<()> {
            self.calls += 1;
            self.seen.push(workload.to_string());
            if self.fail_on == Some(self.calls) {
                return Err(BenchError::Execution {
                    workload: workload.to_string(),
                    status: "exit status: 1".to_string(),
                    stderr: "boom".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_warmup_runs_are_not_recorded() {
        let executor = TrialExecutor::new(5, 2).unwrap();
        let mut runner = FakeRunner::new(None);

        let samples = executor
            .run_benchmark(&mut runner, "update.sql", "pg_tviews")
            .unwrap();

        assert_eq!(runner.calls, 7);
        assert_eq!(samples.len(), 5);
    }

    #[test]
    fn test_samples_preserve_execution_order() {
        let executor = TrialExecutor::new(4, 0).unwrap();
        let mut runner = FakeRunner::new(None);

        let samples = executor
            .run_benchmark(&mut runner, "update.sql", "traditional")
            .unwrap();

        let iterations: Vec<usize> = samples.iter().map(|s| s.iteration).collect();
        assert_eq!(iterations, vec![0, 1, 2, 3]);
        assert!(samples.iter().all(|s| s.name == "update.sql"));
        assert!(samples.iter().all(|s| s.implementation == "traditional"));
        assert!(samples.iter().all(|s| s.duration_ms >= 0.0));
    }

    #[test]
    fn test_measured_failure_aborts_benchmark() {
        let executor = TrialExecutor::new(10, 2).unwrap();
        // Third call is the first measured iteration
        let mut runner = FakeRunner::new(Some(3));

        let err = executor
            .run_benchmark(&mut runner, "bulk.sql", "pg_tviews")
            .unwrap_err();

        assert!(matches!(err, BenchError::Execution { .. }));
        assert_eq!(runner.calls, 3, "no further iterations after a failure");
    }

    #[test]
    fn test_warmup_failure_is_propagated() {
        let executor = TrialExecutor::new(3, 2).unwrap();
        let mut runner = FakeRunner::new(Some(1));

        let result = executor.run_benchmark(&mut runner, "bulk.sql", "pg_tviews");

        assert!(result.is_err());
        assert_eq!(runner.calls, 1);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        assert!(TrialExecutor::new(0, 2).is_err());
    }

    #[test]
    fn test_psql_command_line() {
        let runner = PsqlRunner::new("psql", Some("bench".to_string()));
        let cmd = runner.command("test/update.sql");
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args, vec!["-d", "bench", "-f", "test/update.sql", "-q"]);
    }

    #[test]
    fn test_psql_spawn_failure() {
        let mut runner = PsqlRunner::new("/nonexistent/tvbench-psql", None);
        let err = runner.execute("x.sql").unwrap_err();
        assert!(matches!(err, BenchError::Spawn { .. }));
    }
}
