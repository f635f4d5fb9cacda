#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Line-sensor driver logic (hardware-agnostic).
//!
//! All hardware access goes through `linetrace_traits::HardwareChannel`:
//! select one mux channel, take one raw sample.
//!
//! ## Pipeline
//!
//! - **Sampling**: every read sweeps the array `samples_per_sensor` times and
//!   averages with integer rounding (`sampler` module)
//! - **Calibration**: per-sensor min/max envelope built from repeated passes,
//!   normalization onto `[0, 1000]` (`calibration` module)
//! - **Position**: weighted centroid on `[0, (N-1)*1000]` with edge fallback
//!   when the line is lost (`position` module)
//!
//! [`LineSensor`] owns the channel and all three stages; build it with
//! [`LineSensor::builder`] or [`build_line_sensor`].
//!
//! Everything is integer arithmetic with fixed-capacity buffers sized for
//! [`config::MAX_SENSORS`] sensors.

pub mod builder;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod driver;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod position;
pub mod runner;
pub mod sampler;
pub mod types;
pub mod util;

pub use builder::{LineSensorBuilder, Missing, build_line_sensor};
pub use calibration::{CalibrationEnvelope, Calibrator};
pub use config::{DriverCfg, EstimatorCfg};
pub use driver::LineSensor;
pub use error::{BuildError, Report, Result, SensorError};
pub use position::{LinePosition, LostSide, PositionEstimator};
pub use runner::{RunSummary, run_calibration, track};
pub use sampler::{Sampler, SamplingConfig};
pub use types::{CalibratedSet, Frame, SampleSet};
