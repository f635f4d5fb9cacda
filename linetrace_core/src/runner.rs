//! Calibration and tracking loops around a [`LineSensor`].
//!
//! Both loops run on the caller's thread and poll a stop flag between
//! iterations, so a Ctrl-C handler can end them cleanly.

use std::sync::atomic::{AtomicBool, Ordering};

use linetrace_traits::HardwareChannel;
use tracing::{debug, info};

use crate::driver::LineSensor;
use crate::error::Result;
use crate::types::Frame;

/// Outcome of a bounded loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Iterations that completed.
    pub completed: u64,
    /// True when the stop flag ended the loop early.
    pub stopped: bool,
}

/// Run up to `passes` calibration passes.
///
/// `before_pass(k)` runs ahead of pass `k`; use it to move the array (or a
/// simulated line) across the surface.
pub fn run_calibration<H, F>(
    sensor: &mut LineSensor<H>,
    passes: u32,
    stop: &AtomicBool,
    mut before_pass: F,
) -> Result<RunSummary>
where
    H: HardwareChannel,
    F: FnMut(u32),
{
    info!(passes, "calibration start");
    let mut completed = 0u64;
    for k in 0..passes {
        if stop.load(Ordering::Relaxed) {
            info!(completed, "calibration stopped");
            return Ok(RunSummary {
                completed,
                stopped: true,
            });
        }
        before_pass(k);
        sensor.calibrate_pass()?;
        completed += 1;
    }
    debug!(
        minimum = ?sensor.envelope().minimum(),
        maximum = ?sensor.envelope().maximum(),
        "calibration envelope"
    );
    info!(completed, "calibration complete");
    Ok(RunSummary {
        completed,
        stopped: false,
    })
}

/// Read frames until `max_reads` is reached (unbounded when `None`) or the
/// stop flag is set. Each frame goes to `on_frame` with its sequence number.
pub fn track<H, F>(
    sensor: &mut LineSensor<H>,
    max_reads: Option<u64>,
    stop: &AtomicBool,
    mut on_frame: F,
) -> Result<RunSummary>
where
    H: HardwareChannel,
    F: FnMut(u64, &Frame) -> Result<()>,
{
    info!(?max_reads, "tracking start");
    let mut seq = 0u64;
    loop {
        if max_reads.is_some_and(|max| seq >= max) {
            break;
        }
        if stop.load(Ordering::Relaxed) {
            info!(reads = seq, "tracking stopped");
            return Ok(RunSummary {
                completed: seq,
                stopped: true,
            });
        }
        let frame = sensor.read_frame()?;
        on_frame(seq, &frame)?;
        seq += 1;
    }
    info!(reads = seq, "tracking complete");
    Ok(RunSummary {
        completed: seq,
        stopped: false,
    })
}
