#![no_main]

use libfuzzer_sys::fuzz_target;
use tvbench::aggregate::DataScale;
use tvbench::Baseline;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Neither parser may panic on arbitrary input
        if let Ok(baseline) = Baseline::from_json_str(input) {
            for name in baseline.benchmarks.keys() {
                let _ = baseline.entry(name);
            }
        }
        let _ = input.parse::<DataScale>();
    }
});
