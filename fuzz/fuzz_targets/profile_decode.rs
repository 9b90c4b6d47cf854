#![no_main]

use circuit_profiler::display::DisplayGraph;
use circuit_profiler::profile::CircuitProfile;
use circuit_profiler::selection::CircuitSelector;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Malformed profiles must be rejected with an error, never a panic
        if let Ok(profile) = CircuitProfile::from_json_str(input) {
            let selector = CircuitSelector::new(&profile);
            let _ = DisplayGraph::from_profile(&profile, &selector.selection());
        }
    }
});
