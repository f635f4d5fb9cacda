//! Human-readable error descriptions and structured JSON error formatting.

use linetrace_core::error::{BuildError, SensorError};

/// Stable exit codes; clap exits with 2 on usage errors.
pub const EXIT_OTHER: i32 = 1;
pub const EXIT_NOT_CALIBRATED: i32 = 3;
pub const EXIT_HARDWARE: i32 = 4;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(BuildError::InvalidConfig(msg)) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: Invalid driver configuration ({msg}).\nLikely causes: Out-of-range values in the [array] or [estimator] sections.\nHow to fix: Edit the config file, then rerun."
        );
    }

    if let Some(se) = err.downcast_ref::<SensorError>() {
        return match se {
            SensorError::NotCalibrated => {
                "What happened: Calibrated readings were requested before any calibration pass ran.\nLikely causes: [calibration].enabled = false, so no pass ever ran.\nHow to fix: Enable calibration in the config, or use `linetrace read` for raw values.".to_string()
            }
            SensorError::HardwareFault(msg) => format!(
                "What happened: The sensor backend reported a fault ({msg}).\nLikely causes: sensor_count larger than the channels wired (or the trace has fewer columns), or a select line that cannot be driven.\nHow to fix: Match [array].sensor_count and channel_map to the board or trace, and check the [pins] values."
            ),
            SensorError::Hardware(msg) => format!(
                "What happened: Reading the sensor array failed ({msg}).\nLikely causes: ADC not responding, SPI disabled, or loose wiring to the mux.\nHow to fix: Check power and wiring, enable SPI, then run `linetrace self-check`."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("open mux select pins") {
        return "What happened: Failed to initialize the mux select pins or the ADC.\nLikely causes: Incorrect pin numbers, SPI disabled, or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; ensure the process has permission to access GPIO and SPI.".to_string();
    }

    if lower.contains("read config") {
        return format!(
            "What happened: Could not read the config file.\nLikely causes: Wrong --config path.\nHow to fix: Pass --config <FILE> pointing at a TOML config. Original: {msg}"
        );
    }

    if lower.contains("parse config") || lower.contains("invalid configuration") {
        let detail = err.root_cause();
        return format!(
            "What happened: Configuration is invalid or incomplete ({detail}).\nLikely causes: Missing [array] section or out-of-range values.\nHow to fix: Edit the TOML config and try again."
        );
    }

    if lower.contains("trace csv") {
        return format!(
            "What happened: The trace CSV could not be used ({msg}).\nLikely causes: Header is not s0,s1,... or a row has the wrong number of values.\nHow to fix: Fix the trace file; expected header 's0,s1,...,s{{N-1}}'."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Map the error kind to a stable process exit code.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<SensorError>() {
        Some(SensorError::NotCalibrated) => EXIT_NOT_CALIBRATED,
        Some(SensorError::Hardware(_) | SensorError::HardwareFault(_)) => EXIT_HARDWARE,
        None if err.downcast_ref::<linetrace_hardware::HwError>().is_some() => EXIT_HARDWARE,
        None => EXIT_OTHER,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<SensorError>() {
        Some(SensorError::NotCalibrated) => "NotCalibrated",
        Some(SensorError::Hardware(_)) => "Hardware",
        Some(SensorError::HardwareFault(_)) => "HardwareFault",
        None if err.downcast_ref::<BuildError>().is_some() => "InvalidConfig",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "event": "error",
        "reason": reason_name(err),
        "exit_code": exit_code_for_error(err),
        "message": humanize(err),
    })
    .to_string()
}
