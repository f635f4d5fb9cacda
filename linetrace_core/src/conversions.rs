//! `From` implementations bridging `linetrace_config` types to `linetrace_core` types.

use crate::config::{DriverCfg, EstimatorCfg};

impl From<&linetrace_config::EstimatorCfg> for EstimatorCfg {
    fn from(c: &linetrace_config::EstimatorCfg) -> Self {
        Self {
            detect_threshold: c.detect_threshold,
            noise_threshold: c.noise_threshold,
        }
    }
}

impl From<&linetrace_config::Config> for DriverCfg {
    fn from(c: &linetrace_config::Config) -> Self {
        Self {
            sensor_count: c.array.sensor_count,
            max_raw: c.array.max_raw,
            samples_per_sensor: c.sampling.samples_per_sensor,
            calibration_enabled: c.calibration.enabled,
            estimator: (&c.estimator).into(),
        }
    }
}
