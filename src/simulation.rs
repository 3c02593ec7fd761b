//! Canned timings for running the regression check without a database
//!
//! Known benchmarks replay fixed tables (cycled when more iterations are
//! requested). Unknown names draw uniformly from [1.0, 10.0) ms.

use crate::executor::RawSample;
use rand::Rng;

/// Implementation label attached to simulated samples
pub const SIMULATED: &str = "simulated";

const SINGLE_ROW_UPDATE: [f64; 10] = [2.1, 2.0, 2.2, 2.1, 2.0, 2.3, 2.1, 2.0, 2.2, 2.1];
const CASCADE_10_ENTITIES: [f64; 10] = [45.9, 46.1, 45.8, 46.2, 45.7, 46.0, 45.9, 46.3, 45.8, 46.1];
const BULK_1K_ROWS: [f64; 10] = [
    10000.0, 10500.0, 9800.0, 10200.0, 10100.0, 9900.0, 10300.0, 10100.0, 10200.0, 10000.0,
];

fn canned_table(name: &str) -> Option<&'static [f64]> {
    match name {
        "single_row_update" => Some(&SINGLE_ROW_UPDATE),
        "cascade_10_entities" => Some(&CASCADE_10_ENTITIES),
        "bulk_1k_rows" => Some(&BULK_1K_ROWS),
        _ => None,
    }
}

/// Produce `iterations` simulated durations for `name`
pub fn simulated_durations<R: Rng + ?Sized>(name: &str, iterations: usize, rng: &mut R) -> Vec<f64> {
    match canned_table(name) {
        Some(table) => table.iter().copied().cycle().take(iterations).collect(),
        None => {
            tracing::debug!(name, "no canned timings, generating synthetic samples");
            (0..iterations).map(|_| rng.gen_range(1.0..10.0)).collect()
        }
    }
}

/// Simulated samples in iteration order, labelled `SIMULATED`
pub fn simulate_samples<R: Rng + ?Sized>(name: &str, iterations: usize, rng: &mut R) -> Vec<RawSample> {
    simulated_durations(name, iterations, rng)
        .into_iter()
        .enumerate()
        .map(|(iteration, duration_ms)| RawSample {
            name: name.to_string(),
            implementation: SIMULATED.to_string(),
            duration_ms,
            iteration,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_known_benchmark_replays_table() {
        let mut rng = StdRng::seed_from_u64(7);
        let durations = simulated_durations("single_row_update", 10, &mut rng);
        assert_eq!(durations, SINGLE_ROW_UPDATE.to_vec());
    }

    #[test]
    fn test_fewer_iterations_truncate() {
        let mut rng = StdRng::seed_from_u64(7);
        let durations = simulated_durations("cascade_10_entities", 3, &mut rng);
        assert_eq!(durations, vec![45.9, 46.1, 45.8]);
    }

    #[test]
    fn test_more_iterations_cycle_table() {
        let mut rng = StdRng::seed_from_u64(7);
        let durations = simulated_durations("bulk_1k_rows", 12, &mut rng);
        assert_eq!(durations.len(), 12);
        assert_eq!(durations[10], 10000.0);
        assert_eq!(durations[11], 10500.0);
    }

    #[test]
    fn test_unknown_benchmark_is_uniform_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let durations = simulated_durations("mystery", 50, &mut rng);
        assert_eq!(durations.len(), 50);
        assert!(durations.iter().all(|d| (1.0..10.0).contains(d)));
    }

    #[test]
    fn test_samples_are_labelled_and_indexed() {
        let mut rng = StdRng::seed_from_u64(1);
        let samples = simulate_samples("single_row_update", 4, &mut rng);
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[3].iteration, 3);
        assert!(samples.iter().all(|s| s.implementation == SIMULATED));
    }
}
