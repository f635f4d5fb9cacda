//! Software stand-ins for the sensor board.

use std::cell::Cell;
use std::rc::Rc;

use linetrace_traits::{BoxError, HardwareChannel};
use tracing::trace;

use crate::error::{HwError, Result};

/// Shared handle for moving the simulated line while the driver owns the channel.
#[derive(Debug, Clone, Default)]
pub struct LineHandle(Rc<Cell<Option<i32>>>);

impl LineHandle {
    /// Centre of the line in sensor-pitch milli-units (`sensor * 1000`).
    /// `None` takes the line off the array.
    pub fn set(&self, position: Option<i32>) {
        self.0.set(position);
    }

    pub fn get(&self) -> Option<i32> {
        self.0.get()
    }
}

/// Reflectance surface with a single dark line under an evenly spaced array.
///
/// Each sensor sees `background` off the line and rises linearly to `line`
/// as the line centre approaches it, reaching `background` again at
/// `half_width` milli-units away.
pub struct SimulatedChannel {
    sensor_count: u8,
    selected: u8,
    background: u16,
    line: u16,
    half_width: i32,
    jitter: u16,
    rng: u32,
    position: LineHandle,
    samples: u64,
}

impl SimulatedChannel {
    pub fn new(sensor_count: u8) -> Self {
        Self {
            sensor_count,
            selected: 0,
            background: 80,
            line: 900,
            half_width: 1200,
            jitter: 0,
            rng: 0x9E37_79B9,
            position: LineHandle::default(),
            samples: 0,
        }
    }

    /// Raw levels off and on the line.
    pub fn with_levels(mut self, background: u16, line: u16) -> Self {
        self.background = background;
        self.line = line;
        self
    }

    pub fn with_half_width(mut self, half_width: i32) -> Self {
        self.half_width = half_width.max(1);
        self
    }

    /// Deterministic noise of up to `±amplitude` counts per sample.
    pub fn with_jitter(mut self, amplitude: u16, seed: u32) -> Self {
        self.jitter = amplitude;
        self.rng = seed.max(1);
        self
    }

    pub fn with_line_at(self, position: Option<i32>) -> Self {
        self.position.set(position);
        self
    }

    pub fn line_handle(&self) -> LineHandle {
        self.position.clone()
    }

    /// Total `sample_raw()` calls served.
    pub fn samples_served(&self) -> u64 {
        self.samples
    }

    fn level_for(&self, sensor: u8) -> i32 {
        let bg = i32::from(self.background);
        let Some(centre) = self.position.get() else {
            return bg;
        };
        let dist = (i32::from(sensor) * 1000 - centre).abs();
        if dist >= self.half_width {
            return bg;
        }
        let span = i32::from(self.line) - bg;
        bg + span * (self.half_width - dist) / self.half_width
    }

    fn next_noise(&mut self) -> i32 {
        if self.jitter == 0 {
            return 0;
        }
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        let span = 2 * u32::from(self.jitter) + 1;
        (x % span) as i32 - i32::from(self.jitter)
    }
}

impl HardwareChannel for SimulatedChannel {
    fn select_channel(&mut self, index: u8) -> std::result::Result<(), BoxError> {
        if index >= self.sensor_count {
            return Err(HwError::ChannelOutOfRange {
                index,
                channels: self.sensor_count,
            }
            .into());
        }
        self.selected = index;
        Ok(())
    }

    fn sample_raw(&mut self) -> std::result::Result<u16, BoxError> {
        let v = self.level_for(self.selected) + self.next_noise();
        self.samples += 1;
        let raw = v.clamp(0, i32::from(u16::MAX)) as u16;
        trace!(sensor = self.selected, raw, "sim sample");
        Ok(raw)
    }
}

/// Replays recorded raw frames, one frame per sweep over the array.
///
/// A sweep starts whenever channel 0 is selected. Once the trace runs out the
/// last frame repeats.
pub struct ReplayChannel {
    frames: Vec<Vec<u16>>,
    cursor: usize,
    started: bool,
    selected: u8,
}

impl ReplayChannel {
    pub fn new(frames: Vec<Vec<u16>>) -> Result<Self> {
        if frames.is_empty() {
            return Err(HwError::EmptyTrace);
        }
        Ok(Self {
            frames,
            cursor: 0,
            started: false,
            selected: 0,
        })
    }

    /// Index of the frame currently being served.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

impl HardwareChannel for ReplayChannel {
    fn select_channel(&mut self, index: u8) -> std::result::Result<(), BoxError> {
        if index == 0 {
            if self.started {
                self.cursor = (self.cursor + 1).min(self.frames.len() - 1);
            }
            self.started = true;
        }
        self.selected = index;
        Ok(())
    }

    fn sample_raw(&mut self) -> std::result::Result<u16, BoxError> {
        let frame = &self.frames[self.cursor];
        frame.get(usize::from(self.selected)).copied().ok_or_else(|| {
            HwError::ChannelOutOfRange {
                index: self.selected,
                channels: frame.len() as u8,
            }
            .into()
        })
    }
}
