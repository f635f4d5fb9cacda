use rppal::gpio::{Gpio, OutputPin};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::trace;

use crate::channel_map::SELECT_LINES;
use crate::error::{HwError, Result};
use crate::mux::AnalogInput;

/// MCP3008 10-bit SPI ADC, one single-ended input.
pub struct Mcp3008 {
    spi: Spi,
    input: u8,
}

impl Mcp3008 {
    pub const MAX_RAW: u16 = 1023;

    pub fn new(bus: Bus, slave: SlaveSelect, clock_hz: u32, input: u8) -> Result<Self> {
        if input > 7 {
            return Err(HwError::Spi(format!("mcp3008 has inputs 0..=7, got {input}")));
        }
        let spi = Spi::new(bus, slave, clock_hz, Mode::Mode0)
            .map_err(|e| HwError::Spi(format!("open spi: {e}")))?;
        Ok(Self { spi, input })
    }
}

impl AnalogInput for Mcp3008 {
    fn read(&mut self) -> Result<u16> {
        // Start bit, then single-ended mode + input number, then clock out 10 bits.
        let tx = [0x01, (0x08 | self.input) << 4, 0x00];
        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(format!("transfer: {e}")))?;
        let raw = (u16::from(rx[1] & 0x03) << 8) | u16::from(rx[2]);
        trace!(raw, input = self.input, "mcp3008 read");
        Ok(raw)
    }
}

/// Claim the three mux select lines as outputs, driven low.
pub fn open_select_pins(bcm: [u8; SELECT_LINES]) -> Result<[OutputPin; SELECT_LINES]> {
    let gpio = Gpio::new().map_err(|e| HwError::Gpio(format!("open gpio: {e}")))?;
    let open = |pin: u8| -> Result<OutputPin> {
        gpio.get(pin)
            .map(|p| p.into_output_low())
            .map_err(|e| HwError::Gpio(format!("open select pin {pin}: {e}")))
    };
    Ok([open(bcm[0])?, open(bcm[1])?, open(bcm[2])?])
}
