use embedded_hal::digital::OutputPin;
use linetrace_traits::{BoxError, HardwareChannel};
use tracing::trace;

use crate::channel_map::{ChannelMap, SELECT_LINES};
use crate::error::{HwError, Result};

/// A single-ended ADC input sampled on demand.
pub trait AnalogInput {
    fn read(&mut self) -> Result<u16>;
}

impl<F> AnalogInput for F
where
    F: FnMut() -> Result<u16>,
{
    fn read(&mut self) -> Result<u16> {
        self()
    }
}

/// Analog multiplexer with three select lines in front of one ADC input.
pub struct MuxChannel<P, A> {
    select: [P; SELECT_LINES],
    adc: A,
    map: ChannelMap,
}

impl<P, A> MuxChannel<P, A>
where
    P: OutputPin,
    A: AnalogInput,
{
    /// `select[k]` is driven by bit `k` of each sensor's select code.
    pub fn new(select: [P; SELECT_LINES], adc: A, map: ChannelMap) -> Self {
        Self { select, adc, map }
    }

    pub fn channel_map(&self) -> &ChannelMap {
        &self.map
    }

    /// Drive the select lines for sensor `index`.
    pub fn select(&mut self, index: u8) -> Result<()> {
        let code = self.map.code(index).ok_or(HwError::ChannelOutOfRange {
            index,
            channels: self.map.len() as u8,
        })?;
        for (line, pin) in self.select.iter_mut().enumerate() {
            let res = if code.line(line) {
                pin.set_high()
            } else {
                pin.set_low()
            };
            res.map_err(|e| HwError::Gpio(format!("select line {line}: {e:?}")))?;
        }
        trace!(index, code = code.bits(), "mux select");
        Ok(())
    }

    /// Give the pins and ADC back.
    pub fn release(self) -> ([P; SELECT_LINES], A) {
        (self.select, self.adc)
    }
}

impl<P, A> HardwareChannel for MuxChannel<P, A>
where
    P: OutputPin,
    A: AnalogInput,
{
    fn select_channel(&mut self, index: u8) -> std::result::Result<(), BoxError> {
        self.select(index)?;
        Ok(())
    }

    fn sample_raw(&mut self) -> std::result::Result<u16, BoxError> {
        Ok(self.adc.read()?)
    }
}
