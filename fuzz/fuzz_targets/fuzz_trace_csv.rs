#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(trace) = linetrace_config::parse_trace(data) {
        let width = trace.sensor_count();
        assert!(width >= 1);
        assert!(trace.frames.iter().all(|f| f.len() == width));
    }
});
