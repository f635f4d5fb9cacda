//! Type-state builder for `LineSensor`.
//!
//! `build()` only exists once a hardware channel has been supplied. Config
//! values are validated there; sample counts are clamped rather than rejected.

use linetrace_traits::HardwareChannel;

use crate::config::{CALIBRATED_MAX, DriverCfg, EstimatorCfg, MAX_SENSORS};
use crate::driver::LineSensor;
use crate::error::{BuildError, Result};

impl LineSensor<Missing> {
    /// Start building a LineSensor.
    pub fn builder() -> LineSensorBuilder<Missing> {
        LineSensorBuilder::default()
    }
}

// ── Type-state marker ────────────────────────────────────────────────────────

pub struct Missing;

/// Builder for `LineSensor`. All fields are validated on `build()`.
pub struct LineSensorBuilder<H> {
    channel: H,
    cfg: DriverCfg,
}

impl Default for LineSensorBuilder<Missing> {
    fn default() -> Self {
        Self {
            channel: Missing,
            cfg: DriverCfg::default(),
        }
    }
}

impl LineSensorBuilder<Missing> {
    pub fn with_channel<H: HardwareChannel>(self, channel: H) -> LineSensorBuilder<H> {
        LineSensorBuilder {
            channel,
            cfg: self.cfg,
        }
    }
}

impl<H> LineSensorBuilder<H> {
    /// Replace the whole config at once (e.g. from `linetrace_config`).
    pub fn with_config(mut self, cfg: DriverCfg) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn with_sensor_count(mut self, n: u8) -> Self {
        self.cfg.sensor_count = n;
        self
    }

    pub fn with_max_raw(mut self, max_raw: u16) -> Self {
        self.cfg.max_raw = max_raw;
        self
    }

    pub fn with_samples_per_sensor(mut self, count: u32) -> Self {
        self.cfg.samples_per_sensor = count;
        self
    }

    pub fn with_calibration_enabled(mut self, on: bool) -> Self {
        self.cfg.calibration_enabled = on;
        self
    }

    pub fn with_estimator(mut self, estimator: EstimatorCfg) -> Self {
        self.cfg.estimator = estimator;
        self
    }
}

impl<H: HardwareChannel> LineSensorBuilder<H> {
    pub fn build(self) -> Result<LineSensor<H>> {
        build_line_sensor(self.channel, self.cfg)
    }
}

/// Validate configuration and construct a `LineSensor`.
///
/// Single source of truth for validation, used by `LineSensorBuilder::build()`.
pub fn build_line_sensor<H: HardwareChannel>(channel: H, cfg: DriverCfg) -> Result<LineSensor<H>> {
    if cfg.sensor_count == 0 || usize::from(cfg.sensor_count) > MAX_SENSORS {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "sensor_count must be in 1..=16",
        )));
    }
    if cfg.max_raw == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "max_raw must be > 0",
        )));
    }
    if cfg.estimator.detect_threshold > CALIBRATED_MAX
        || cfg.estimator.noise_threshold > CALIBRATED_MAX
    {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "estimator thresholds must be <= 1000",
        )));
    }
    // Keeps the centroid denominator nonzero whenever the line is detected.
    if cfg.estimator.detect_threshold <= cfg.estimator.noise_threshold {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "detect_threshold must be > noise_threshold",
        )));
    }

    let sensor = LineSensor::from_parts(channel, &cfg);
    tracing::debug!(
        sensors = cfg.sensor_count,
        max_raw = cfg.max_raw,
        samples = sensor.sampling().samples_per_sensor(),
        calibration_enabled = cfg.calibration_enabled,
        "line sensor built"
    );
    Ok(sensor)
}
