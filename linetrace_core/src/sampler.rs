//! Channel-multiplexed sampling.
//!
//! One read sweeps every channel `samples_per_sensor` times in sensor-index
//! order, summing into per-sensor `u32` accumulators, then reduces each sum to
//! a rounded average. Power-of-two sample counts reduce with a shift.

use linetrace_traits::HardwareChannel;
use tracing::{trace, warn};

use crate::config::{MAX_SAMPLES, MAX_SENSORS};
use crate::error::SensorError;
use crate::hw_error::map_hw_error;
use crate::types::SampleSet;
use crate::util::{div_round_nearest, shift_for, shift_round_nearest};

// 64 samples of a full-scale u16 must fit the accumulator.
const _: () = assert!((u16::MAX as u64) * (MAX_SAMPLES as u64) <= u32::MAX as u64);

/// Sample count and the shift derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingConfig {
    samples_per_sensor: u8,
    shift_amount: u8,
}

impl SamplingConfig {
    /// Clamps `count` into `1..=MAX_SAMPLES`.
    pub fn new(count: u32) -> Self {
        let samples = count.clamp(1, u32::from(MAX_SAMPLES)) as u8;
        Self {
            samples_per_sensor: samples,
            shift_amount: shift_for(samples),
        }
    }

    #[inline]
    pub fn samples_per_sensor(&self) -> u8 {
        self.samples_per_sensor
    }

    /// log2 of the sample count when it is a power of two above one, else 0
    /// (reduce by division).
    #[inline]
    pub fn shift_amount(&self) -> u8 {
        self.shift_amount
    }

    /// Reduce an accumulated sum to the rounded per-sample average.
    #[inline]
    pub fn average(&self, sum: u32) -> u32 {
        if self.shift_amount > 0 {
            shift_round_nearest(sum, self.shift_amount)
        } else {
            div_round_nearest(sum, u32::from(self.samples_per_sensor))
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self::new(4)
    }
}

#[derive(Debug, Clone)]
pub struct Sampler {
    sensor_count: u8,
    max_raw: u16,
    config: SamplingConfig,
}

impl Sampler {
    pub fn new(sensor_count: u8, max_raw: u16, samples_per_sensor: u32) -> Self {
        debug_assert!((1..=MAX_SENSORS).contains(&usize::from(sensor_count)));
        Self {
            sensor_count,
            max_raw,
            config: SamplingConfig::new(samples_per_sensor),
        }
    }

    pub fn configure(&mut self, count: u32) {
        self.config = SamplingConfig::new(count);
    }

    #[inline]
    pub fn config(&self) -> SamplingConfig {
        self.config
    }

    #[inline]
    pub fn sensor_count(&self) -> u8 {
        self.sensor_count
    }

    #[inline]
    pub fn max_raw(&self) -> u16 {
        self.max_raw
    }

    /// One averaged reading per sensor.
    ///
    /// Hardware errors abort the read; there are no retries.
    pub fn read<H: HardwareChannel + ?Sized>(&self, channel: &mut H) -> Result<SampleSet, SensorError> {
        let mut sums: heapless::Vec<u32, MAX_SENSORS> =
            std::iter::repeat_n(0u32, usize::from(self.sensor_count)).collect();

        for _ in 0..self.config.samples_per_sensor {
            for (index, sum) in (0u8..).zip(sums.iter_mut()) {
                channel
                    .select_channel(index)
                    .map_err(|e| map_hw_error(&*e))?;
                let raw = channel.sample_raw().map_err(|e| map_hw_error(&*e))?;
                *sum += u32::from(self.clamp_raw(index, raw));
            }
        }

        let out: SampleSet = sums
            .iter()
            .map(|&sum| self.config.average(sum) as u16)
            .collect();
        trace!(readings = ?out.as_slice(), "sampler read");
        Ok(out)
    }

    fn clamp_raw(&self, index: u8, raw: u16) -> u16 {
        if raw > self.max_raw {
            warn!(sensor = index, raw, max_raw = self.max_raw, "raw sample above max_raw, clamped");
            self.max_raw
        } else {
            raw
        }
    }
}
