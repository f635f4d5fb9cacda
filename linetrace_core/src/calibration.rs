//! Per-sensor calibration envelope and normalization.
//!
//! ## Merge rule
//!
//! Each pass takes [`CALIBRATION_READS`] reads and records, per sensor, the
//! smallest and largest reading of that pass. The persistent envelope is then
//! moved with a crossover rule:
//!
//! - `maximum` rises to the pass **minimum** when that is higher;
//! - `minimum` falls to the pass **maximum** when that is lower.
//!
//! A perfectly flat first pass collapses the envelope to a single
//! point (`minimum == maximum`), which normalizes to 0 until a later pass
//! over a different surface opens it up.
//!
//! ## Lifecycle
//!
//! `initialized` goes `false -> true` inside the first pass and never back.
//! [`Calibrator::reset`] re-seeds the bounds but leaves the flag alone.

use linetrace_traits::HardwareChannel;
use tracing::debug;

use crate::config::{CALIBRATED_MAX, CALIBRATION_READS, MAX_SENSORS};
use crate::error::SensorError;
use crate::sampler::Sampler;

/// Per-sensor `{minimum, maximum}` raw bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationEnvelope {
    minimum: heapless::Vec<u16, MAX_SENSORS>,
    maximum: heapless::Vec<u16, MAX_SENSORS>,
    initialized: bool,
}

impl CalibrationEnvelope {
    /// Uninitialized envelope with every sensor at `{max_raw, 0}`.
    pub fn new(sensor_count: u8, max_raw: u16) -> Self {
        let n = usize::from(sensor_count);
        Self {
            minimum: std::iter::repeat_n(max_raw, n).collect(),
            maximum: std::iter::repeat_n(0, n).collect(),
            initialized: false,
        }
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn minimum(&self) -> &[u16] {
        &self.minimum
    }

    pub fn maximum(&self) -> &[u16] {
        &self.maximum
    }

    pub fn len(&self) -> usize {
        self.minimum.len()
    }

    pub fn is_empty(&self) -> bool {
        self.minimum.is_empty()
    }

    fn seed(&mut self, max_raw: u16) {
        self.minimum.iter_mut().for_each(|m| *m = max_raw);
        self.maximum.iter_mut().for_each(|m| *m = 0);
    }

    /// Fold one pass's per-sensor extremes into the envelope.
    fn merge_pass(&mut self, pass_min: &[u16], pass_max: &[u16]) {
        let bounds = self.minimum.iter_mut().zip(self.maximum.iter_mut());
        for ((min, max), (&lo, &hi)) in bounds.zip(pass_min.iter().zip(pass_max)) {
            if lo > *max {
                *max = lo;
            }
            if hi < *min {
                *min = hi;
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Calibrator {
    envelope: CalibrationEnvelope,
    max_raw: u16,
}

impl Calibrator {
    pub fn new(sensor_count: u8, max_raw: u16) -> Self {
        Self {
            envelope: CalibrationEnvelope::new(sensor_count, max_raw),
            max_raw,
        }
    }

    pub fn envelope(&self) -> &CalibrationEnvelope {
        &self.envelope
    }

    #[inline]
    pub fn is_calibrated(&self) -> bool {
        self.envelope.initialized
    }

    /// Every maximum to 0 and every minimum to `max_raw`. Does not touch
    /// the initialized flag.
    pub fn reset(&mut self) {
        self.envelope.seed(self.max_raw);
        debug!(initialized = self.envelope.initialized, "calibration reset");
    }

    /// Run one calibration pass of [`CALIBRATION_READS`] reads.
    ///
    /// The envelope is only merged once every read succeeded; a hardware error
    /// part-way leaves the bounds as they were (the first-pass seed, if any,
    /// has already happened).
    pub fn calibrate_pass<H: HardwareChannel + ?Sized>(
        &mut self,
        sampler: &Sampler,
        channel: &mut H,
    ) -> Result<(), SensorError> {
        if !self.envelope.initialized {
            self.envelope.seed(self.max_raw);
            self.envelope.initialized = true;
            debug!(sensors = self.envelope.len(), "calibration envelope seeded");
        }

        let first = sampler.read(channel)?;
        let mut pass_min = first.clone();
        let mut pass_max = first;
        for _ in 1..CALIBRATION_READS {
            let reading = sampler.read(channel)?;
            for ((lo, hi), &v) in pass_min.iter_mut().zip(pass_max.iter_mut()).zip(&reading) {
                *lo = (*lo).min(v);
                *hi = (*hi).max(v);
            }
        }

        self.envelope.merge_pass(&pass_min, &pass_max);
        debug!(
            minimum = ?self.envelope.minimum(),
            maximum = ?self.envelope.maximum(),
            "calibration pass merged"
        );
        Ok(())
    }

    /// Scale `raw` for `sensor` onto `[0, 1000]`.
    ///
    /// A collapsed or inverted envelope (`maximum <= minimum`) yields 0.
    pub fn normalize(&self, raw: u16, sensor: usize) -> Result<u16, SensorError> {
        if !self.envelope.initialized {
            return Err(SensorError::NotCalibrated);
        }
        let min = i32::from(self.envelope.minimum[sensor]);
        let max = i32::from(self.envelope.maximum[sensor]);
        let denom = max - min;
        if denom <= 0 {
            return Ok(0);
        }
        let scaled = (i32::from(raw) - min) * i32::from(CALIBRATED_MAX) / denom;
        Ok(scaled.clamp(0, i32::from(CALIBRATED_MAX)) as u16)
    }

    /// Normalize a whole reading, sensor by sensor.
    pub fn normalize_all(&self, raw: &[u16]) -> Result<heapless::Vec<u16, MAX_SENSORS>, SensorError> {
        raw.iter()
            .enumerate()
            .map(|(i, &v)| self.normalize(v, i))
            .collect()
    }
}
