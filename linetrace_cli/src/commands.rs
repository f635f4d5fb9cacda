//! Subcommand execution: driver assembly, calibration, reads, tracking.

use std::sync::atomic::AtomicBool;

use eyre::{Result, WrapErr};
use linetrace_core::{DriverCfg, Frame, LinePosition, LineSensor, LostSide, RunSummary};
use serde_json::json;

use crate::backend::{self, Backend};

pub struct RunCtx<'a> {
    pub cfg: &'a linetrace_config::Config,
    pub json: bool,
    pub samples: Option<u32>,
    pub stop: &'a AtomicBool,
}

/// Driver config from the TOML, with CLI overrides applied.
pub fn driver_cfg(cfg: &linetrace_config::Config, samples: Option<u32>) -> DriverCfg {
    let mut driver = DriverCfg::from(cfg);
    if let Some(n) = samples {
        driver.samples_per_sensor = n;
    }
    driver
}

fn build(ctx: &RunCtx<'_>, backend: Backend) -> Result<LineSensor<Backend>> {
    let sensor = linetrace_core::build_line_sensor(backend, driver_cfg(ctx.cfg, ctx.samples))?;
    tracing::info!(
        backend = sensor.channel().name(),
        sensors = sensor.sensor_count(),
        samples = sensor.sampling().samples_per_sensor(),
        "line sensor ready"
    );
    Ok(sensor)
}

/// Run calibration passes, sweeping the simulated line across the array.
fn calibrate(sensor: &mut LineSensor<Backend>, passes: u32, stop: &AtomicBool) -> Result<RunSummary> {
    let line = sensor.channel().sim_line();
    let n = sensor.sensor_count();
    if sensor.channel().is_live() {
        tracing::info!("sweep the array across the line until calibration completes");
    }
    linetrace_core::run_calibration(sensor, passes, stop, |k| {
        if let Some(line) = &line {
            line.set(Some(backend::sweep_position(k, passes, n)));
        }
    })
}

fn centre(sensor: &LineSensor<Backend>) -> i32 {
    (i32::from(sensor.sensor_count()) - 1) * 500
}

fn state_of(position: LinePosition) -> (&'static str, Option<&'static str>) {
    match position {
        LinePosition::Tracking(_) => ("tracking", None),
        LinePosition::Lost {
            side: LostSide::Left,
            ..
        } => ("lost", Some("left")),
        LinePosition::Lost {
            side: LostSide::Right,
            ..
        } => ("lost", Some("right")),
    }
}

fn print_frame(json: bool, seq: u64, frame: &Frame) {
    let (state, side) = state_of(frame.position);
    if json {
        println!(
            "{}",
            json!({
                "event": "frame",
                "seq": seq,
                "state": state,
                "side": side,
                "position": frame.position.value(),
                "raw": frame.raw.as_slice(),
                "calibrated": frame.calibrated.as_slice(),
            })
        );
    } else {
        let label = side.map_or(state.to_string(), |s| format!("{state}-{s}"));
        println!(
            "{seq:>6}  position={:>5}  {label:<10}  calibrated={:?}",
            frame.position.value(),
            frame.calibrated.as_slice()
        );
    }
}

fn print_envelope(json: bool, sensor: &LineSensor<Backend>, summary: RunSummary) {
    let env = sensor.envelope();
    if json {
        println!(
            "{}",
            json!({
                "event": "calibration",
                "passes": summary.completed,
                "stopped": summary.stopped,
                "calibrated": sensor.is_calibrated(),
                "minimum": env.minimum(),
                "maximum": env.maximum(),
            })
        );
        return;
    }
    if !sensor.is_calibrated() {
        println!("calibration disabled; envelope not built");
        return;
    }
    println!("calibrated over {} passes", summary.completed);
    for (i, (lo, hi)) in env.minimum().iter().zip(env.maximum()).enumerate() {
        println!("  s{i}: min={lo:>5}  max={hi:>5}");
    }
}

pub fn run_calibrate(ctx: &RunCtx<'_>, backend: Backend, passes: Option<u32>) -> Result<()> {
    let mut sensor = build(ctx, backend)?;
    let passes = passes.unwrap_or(ctx.cfg.calibration.passes);
    let summary = calibrate(&mut sensor, passes, ctx.stop)?;
    print_envelope(ctx.json, &sensor, summary);
    Ok(())
}

pub fn run_read(ctx: &RunCtx<'_>, backend: Backend, count: u32, calibrated: bool) -> Result<()> {
    let mut sensor = build(ctx, backend)?;
    if calibrated {
        calibrate(&mut sensor, ctx.cfg.calibration.passes, ctx.stop)?;
    }
    if let Some(line) = sensor.channel().sim_line() {
        line.set(Some(centre(&sensor)));
    }

    for seq in 0..u64::from(count) {
        if calibrated {
            let frame = sensor.read_frame()?;
            print_frame(ctx.json, seq, &frame);
        } else {
            let raw = sensor.read()?;
            if ctx.json {
                println!("{}", json!({ "event": "read", "seq": seq, "raw": raw.as_slice() }));
            } else {
                println!("{seq:>6}  raw={:?}", raw.as_slice());
            }
        }
    }
    Ok(())
}

pub fn run_track(
    ctx: &RunCtx<'_>,
    backend: Backend,
    reads: Option<u64>,
    line_at: Option<i32>,
    sweep: i32,
) -> Result<()> {
    let mut sensor = build(ctx, backend)?;
    let cal = calibrate(&mut sensor, ctx.cfg.calibration.passes, ctx.stop)?;
    tracing::debug!(passes = cal.completed, "tracking after calibration");

    let line = sensor.channel().sim_line();
    let start = line_at.unwrap_or_else(|| centre(&sensor));
    if let Some(line) = &line {
        line.set(Some(start));
    }

    let json = ctx.json;
    let summary = linetrace_core::track(&mut sensor, reads, ctx.stop, |seq, frame| {
        print_frame(json, seq, frame);
        if let Some(line) = &line {
            let step = i64::from(sweep) * (seq as i64 + 1);
            let next = i64::from(start) + step;
            line.set(Some(i32::try_from(next).wrap_err("simulated line moved out of range")?));
        }
        Ok(())
    })?;

    if json {
        println!(
            "{}",
            json!({
                "event": "track_end",
                "reads": summary.completed,
                "stopped": summary.stopped,
                "last_position": sensor.last_position(),
            })
        );
    } else {
        println!(
            "tracked {} reads{}",
            summary.completed,
            if summary.stopped { " (stopped)" } else { "" }
        );
    }
    Ok(())
}

pub fn run_self_check(ctx: &RunCtx<'_>, backend: Backend) -> Result<()> {
    let live = backend.is_live();
    let map_len = match backend::channel_map(ctx.cfg) {
        Ok(map) => Some(map.len()),
        Err(e) if live => return Err(e),
        Err(e) => {
            tracing::warn!(error = %e, "channel map not usable on a mux board");
            None
        }
    };

    let mut sensor = build(ctx, backend)?;
    let raw = sensor.read()?;
    if raw.len() != usize::from(sensor.sensor_count()) {
        eyre::bail!(
            "self-check read {} values for {} sensors",
            raw.len(),
            sensor.sensor_count()
        );
    }
    let saturated = raw.iter().filter(|&&v| v == sensor.max_raw()).count();
    if saturated > 0 {
        tracing::warn!(saturated, "sensors reading full scale");
    }

    if ctx.json {
        println!(
            "{}",
            json!({
                "event": "self_check",
                "ok": true,
                "backend": sensor.channel().name(),
                "sensors": sensor.sensor_count(),
                "channel_map_entries": map_len,
                "samples_per_sensor": sensor.sampling().samples_per_sensor(),
                "saturated": saturated,
                "raw": raw.as_slice(),
            })
        );
    } else {
        println!(
            "self-check ok: backend={} sensors={} samples={} raw={:?}",
            sensor.channel().name(),
            sensor.sensor_count(),
            sensor.sampling().samples_per_sensor(),
            raw.as_slice()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_flag_overrides_config() {
        let cfg = linetrace_config::load_toml("[array]\nsensor_count = 4\n").unwrap();
        assert_eq!(driver_cfg(&cfg, None).samples_per_sensor, 4);
        assert_eq!(driver_cfg(&cfg, Some(9)).samples_per_sensor, 9);
    }

    #[test]
    fn lost_states_name_their_side() {
        assert_eq!(state_of(LinePosition::Tracking(10)), ("tracking", None));
        assert_eq!(
            state_of(LinePosition::Lost {
                side: LostSide::Right,
                position: 7000
            }),
            ("lost", Some("right"))
        );
    }
}
