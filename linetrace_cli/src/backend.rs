//! Hardware backend selection: replay trace, Raspberry Pi mux, or simulator.

use eyre::{Result, WrapErr};
use linetrace_hardware::{ChannelMap, LineHandle, ReplayChannel, SimulatedChannel};
use linetrace_traits::{BoxError, HardwareChannel};

pub enum Backend {
    Sim(SimulatedChannel),
    Replay(ReplayChannel),
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    Pi(linetrace_hardware::PiMuxChannel),
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sim(_) => "sim",
            Self::Replay(_) => "replay",
            #[cfg(all(feature = "hardware", target_os = "linux"))]
            Self::Pi(_) => "pi",
        }
    }

    /// True when samples come from a physical array.
    pub fn is_live(&self) -> bool {
        !matches!(self, Self::Sim(_) | Self::Replay(_))
    }

    pub fn sim_line(&self) -> Option<LineHandle> {
        match self {
            Self::Sim(sim) => Some(sim.line_handle()),
            _ => None,
        }
    }
}

impl HardwareChannel for Backend {
    fn select_channel(&mut self, index: u8) -> Result<(), BoxError> {
        match self {
            Self::Sim(c) => c.select_channel(index),
            Self::Replay(c) => c.select_channel(index),
            #[cfg(all(feature = "hardware", target_os = "linux"))]
            Self::Pi(c) => c.select_channel(index),
        }
    }

    fn sample_raw(&mut self) -> Result<u16, BoxError> {
        match self {
            Self::Sim(c) => c.sample_raw(),
            Self::Replay(c) => c.sample_raw(),
            #[cfg(all(feature = "hardware", target_os = "linux"))]
            Self::Pi(c) => c.sample_raw(),
        }
    }
}

/// Channel map from config, or the SVK default truncated to the array size.
pub fn channel_map(cfg: &linetrace_config::Config) -> Result<ChannelMap> {
    let map = match &cfg.array.channel_map {
        Some(codes) => ChannelMap::from_codes(codes),
        None => ChannelMap::svk().truncated(usize::from(cfg.array.sensor_count)),
    };
    map.wrap_err("build channel map")
}

/// Open the backend for this run.
pub fn open(cfg: &linetrace_config::Config, trace: Option<&std::path::Path>) -> Result<Backend> {
    if let Some(path) = trace {
        let trace = linetrace_config::load_trace_csv(path)?;
        tracing::info!(
            path = %path.display(),
            frames = trace.frames.len(),
            columns = trace.sensor_count(),
            "replaying trace"
        );
        let ch = ReplayChannel::new(trace.frames).wrap_err("open replay trace")?;
        return Ok(Backend::Replay(ch));
    }

    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        let map = channel_map(cfg)?;
        let p = &cfg.pins;
        let select = [p.select[0], p.select[1], p.select[2]];
        let ch = linetrace_hardware::open_pi_mux(select, p.adc_channel, map)
            .wrap_err("open mux select pins / MCP3008")?;
        tracing::info!(?select, adc_channel = p.adc_channel, "hardware backend");
        Ok(Backend::Pi(ch))
    }

    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    {
        let max = cfg.array.max_raw;
        let sim = SimulatedChannel::new(cfg.array.sensor_count)
            .with_levels(max / 12, max - max / 8)
            .with_jitter(max / 256, 0x5EED);
        tracing::info!(sensors = cfg.array.sensor_count, "simulated backend");
        Ok(Backend::Sim(sim))
    }
}

/// Line position for calibration pass `k` of `passes`: sweeps from two
/// sensors left of the array to two sensors right of it.
pub fn sweep_position(k: u32, passes: u32, sensor_count: u8) -> i32 {
    let start = -2000;
    let end = (i32::from(sensor_count) - 1) * 1000 + 2000;
    if passes <= 1 {
        return start;
    }
    let span = i64::from(end - start);
    let offset = span * i64::from(k) / i64::from(passes - 1);
    start + offset as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_covers_both_edges() {
        assert_eq!(sweep_position(0, 100, 8), -2000);
        assert_eq!(sweep_position(99, 100, 8), 9000);
        assert_eq!(sweep_position(0, 1, 8), -2000);
        let mid = sweep_position(50, 101, 8);
        assert_eq!(mid, 3500);
    }
}
