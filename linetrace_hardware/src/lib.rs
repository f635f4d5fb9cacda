//! Hardware backends for the multiplexed IR line-sensor array.
//!
//! - [`MuxChannel`]: three `embedded-hal` select lines plus an [`AnalogInput`]
//! - [`SimulatedChannel`] / [`ReplayChannel`]: no hardware required
//! - `hardware` feature: Raspberry Pi GPIO select lines and an MCP3008 ADC
pub mod channel_map;
pub mod error;
pub mod mux;
pub mod sim;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod mcp3008;

pub use channel_map::{ChannelMap, MAX_MUX_CHANNELS, SELECT_LINES, SelectCode};
pub use error::HwError;
pub use mux::{AnalogInput, MuxChannel};
pub use sim::{LineHandle, ReplayChannel, SimulatedChannel};

/// Raspberry Pi mux channel: GPIO select lines and an MCP3008 on the mux output.
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub type PiMuxChannel = MuxChannel<rppal::gpio::OutputPin, mcp3008::Mcp3008>;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub fn open_pi_mux(
    select_bcm: [u8; SELECT_LINES],
    adc_input: u8,
    map: ChannelMap,
) -> error::Result<PiMuxChannel> {
    let pins = mcp3008::open_select_pins(select_bcm)?;
    let adc = mcp3008::Mcp3008::new(
        rppal::spi::Bus::Spi0,
        rppal::spi::SlaveSelect::Ss0,
        1_000_000,
        adc_input,
    )?;
    tracing::debug!(?select_bcm, adc_input, channels = map.len(), "pi mux opened");
    Ok(MuxChannel::new(pins, adc, map))
}
