#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = toml::from_str::<linetrace_config::Config>(data) {
        if cfg.validate().is_ok() {
            // A valid config must describe an array the driver can hold.
            assert!((1..=linetrace_config::MAX_SENSORS).contains(&cfg.array.sensor_count));
            assert!(cfg.estimator.detect_threshold > cfg.estimator.noise_threshold);
        }
    }
});
