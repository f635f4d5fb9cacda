//! Runtime configuration for the line-sensor driver.
//!
//! Separate from the TOML-deserialized config in `linetrace_config`; see
//! `conversions` for the mapping.

/// Capacity of every per-sensor buffer.
pub const MAX_SENSORS: usize = 16;
/// Upper clamp for `samples_per_sensor`.
pub const MAX_SAMPLES: u8 = 64;
/// Reads folded into one calibration pass.
pub const CALIBRATION_READS: usize = 10;
/// Full-scale calibrated value.
pub const CALIBRATED_MAX: u16 = 1000;
/// Position units per sensor pitch.
pub const POSITION_SCALE: u32 = 1000;

/// Thresholds on the calibrated `[0, 1000]` scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimatorCfg {
    /// Any sensor strictly above this marks the line as present.
    pub detect_threshold: u16,
    /// Sensors at or below this are dropped from the centroid.
    pub noise_threshold: u16,
}

impl Default for EstimatorCfg {
    fn default() -> Self {
        Self {
            detect_threshold: 200,
            noise_threshold: 50,
        }
    }
}

/// Driver configuration.
#[derive(Debug, Clone)]
pub struct DriverCfg {
    /// Sensors in the array, `1..=MAX_SENSORS`.
    pub sensor_count: u8,
    /// Largest raw value the ADC reports; also the reset value of each minimum.
    pub max_raw: u16,
    /// Samples averaged per sensor per read; clamped to `1..=MAX_SAMPLES`.
    pub samples_per_sensor: u32,
    /// When false, calibration passes are skipped.
    pub calibration_enabled: bool,
    pub estimator: EstimatorCfg,
}

impl Default for DriverCfg {
    fn default() -> Self {
        Self {
            sensor_count: 8,
            max_raw: 1023,
            samples_per_sensor: 4,
            calibration_enabled: true,
            estimator: EstimatorCfg::default(),
        }
    }
}
