//! The line-sensor driver: hardware channel, sampler, calibrator and
//! position estimator behind one `&mut self` surface.

use linetrace_traits::HardwareChannel;
use tracing::{debug, warn};

use crate::calibration::{CalibrationEnvelope, Calibrator};
use crate::config::DriverCfg;
use crate::error::{Result, SensorError};
use crate::position::{LinePosition, PositionEstimator};
use crate::sampler::{Sampler, SamplingConfig};
use crate::types::{CalibratedSet, Frame, SampleSet};

pub struct LineSensor<H> {
    pub(crate) channel: H,
    pub(crate) sampler: Sampler,
    pub(crate) calibrator: Calibrator,
    pub(crate) estimator: PositionEstimator,
    pub(crate) calibration_enabled: bool,
}

impl<H> core::fmt::Debug for LineSensor<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LineSensor")
            .field("sensors", &self.sampler.sensor_count())
            .field("sampling", &self.sampler.config())
            .field("calibrated", &self.calibrator.is_calibrated())
            .field("last_position", &self.estimator.last_position())
            .finish_non_exhaustive()
    }
}

impl<H: HardwareChannel> LineSensor<H> {
    /// Assemble from an already validated config. Use the builder for
    /// validation.
    pub(crate) fn from_parts(channel: H, cfg: &DriverCfg) -> Self {
        Self {
            channel,
            sampler: Sampler::new(cfg.sensor_count, cfg.max_raw, cfg.samples_per_sensor),
            calibrator: Calibrator::new(cfg.sensor_count, cfg.max_raw),
            estimator: PositionEstimator::new(cfg.sensor_count, cfg.estimator),
            calibration_enabled: cfg.calibration_enabled,
        }
    }

    /// Set samples per sensor per read. Out-of-range counts are clamped to
    /// `1..=64` without error.
    pub fn configure_samples(&mut self, count: u32) {
        self.sampler.configure(count);
        let cfg = self.sampler.config();
        debug!(
            requested = count,
            samples = cfg.samples_per_sensor(),
            shift = cfg.shift_amount(),
            "samples per sensor configured"
        );
    }

    /// One calibration pass. A no-op when calibration is disabled.
    pub fn calibrate_pass(&mut self) -> Result<()> {
        if !self.calibration_enabled {
            debug!("calibration disabled; pass skipped");
            return Ok(());
        }
        self.calibrator
            .calibrate_pass(&self.sampler, &mut self.channel)?;
        Ok(())
    }

    /// Re-seed every envelope bound. The driver stays calibrated if it was.
    pub fn reset_calibration(&mut self) {
        self.calibrator.reset();
    }

    /// Averaged raw readings.
    pub fn read(&mut self) -> Result<SampleSet> {
        Ok(self.sampler.read(&mut self.channel)?)
    }

    /// Calibrated readings on `[0, 1000]`.
    ///
    /// Fails with [`SensorError::NotCalibrated`] before the first pass,
    /// without touching the hardware.
    pub fn read_calibrated(&mut self) -> Result<CalibratedSet> {
        self.ensure_calibrated()?;
        let raw = self.sampler.read(&mut self.channel)?;
        Ok(self.calibrator.normalize_all(&raw)?)
    }

    /// Line position in `0..=(N-1)*1000`, with edge fallback when lost.
    pub fn read_line_position(&mut self) -> Result<u16> {
        Ok(self.estimate_line()?.value())
    }

    /// Like [`read_line_position`](Self::read_line_position) but keeps the
    /// tracking/lost distinction.
    pub fn estimate_line(&mut self) -> Result<LinePosition> {
        let calibrated = self.read_calibrated()?;
        Ok(self.estimator.estimate(&calibrated))
    }

    /// Raw, calibrated and position from a single read.
    pub fn read_frame(&mut self) -> Result<Frame> {
        self.ensure_calibrated()?;
        let raw = self.sampler.read(&mut self.channel)?;
        let calibrated = self.calibrator.normalize_all(&raw)?;
        let position = self.estimator.estimate(&calibrated);
        Ok(Frame {
            raw,
            calibrated,
            position,
        })
    }

    fn ensure_calibrated(&self) -> core::result::Result<(), SensorError> {
        if self.calibrator.is_calibrated() {
            Ok(())
        } else {
            warn!("not calibrated");
            Err(SensorError::NotCalibrated)
        }
    }
}

impl<H> LineSensor<H> {
    pub fn is_calibrated(&self) -> bool {
        self.calibrator.is_calibrated()
    }

    pub fn envelope(&self) -> &CalibrationEnvelope {
        self.calibrator.envelope()
    }

    pub fn last_position(&self) -> u16 {
        self.estimator.last_position()
    }

    pub fn sampling(&self) -> SamplingConfig {
        self.sampler.config()
    }

    pub fn sensor_count(&self) -> u8 {
        self.sampler.sensor_count()
    }

    pub fn max_raw(&self) -> u16 {
        self.sampler.max_raw()
    }

    pub fn calibration_enabled(&self) -> bool {
        self.calibration_enabled
    }

    pub fn channel(&self) -> &H {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut H {
        &mut self.channel
    }

    pub fn into_channel(self) -> H {
        self.channel
    }
}
