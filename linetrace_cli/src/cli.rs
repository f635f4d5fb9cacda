//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "linetrace", version, about = "IR line-sensor array CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/linetrace.toml")]
    pub config: PathBuf,

    /// Replay raw frames from a trace CSV (header s0,s1,...) instead of the live array
    #[arg(long, value_name = "FILE")]
    pub trace: Option<PathBuf>,

    /// JSON lines on stdout and JSON logs on stderr
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); defaults to [logging].level, then info
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Override samples per sensor per read (clamped to 1..=64)
    #[arg(long, value_name = "N")]
    pub samples: Option<u32>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the calibration envelope and print it
    Calibrate {
        /// Number of passes (defaults to [calibration].passes)
        #[arg(long, value_name = "N")]
        passes: Option<u32>,
    },
    /// Print raw (or calibrated) readings
    Read {
        /// Frames to print
        #[arg(long, value_name = "N", default_value_t = 1)]
        count: u32,
        /// Calibrate first and print calibrated values and line position
        #[arg(long, action = ArgAction::SetTrue)]
        calibrated: bool,
    },
    /// Calibrate, then stream line positions until --reads or Ctrl-C
    Track {
        /// Stop after this many reads
        #[arg(long, value_name = "N")]
        reads: Option<u64>,
        /// Simulator only: line position in milli-sensor units (default: array centre)
        #[arg(long, value_name = "POS", allow_negative_numbers = true)]
        line_at: Option<i32>,
        /// Simulator only: move the line by this much after every read
        #[arg(long, value_name = "STEP", allow_negative_numbers = true, default_value_t = 0)]
        sweep: i32,
    },
    /// Quick health check (channel map, backend, one raw read)
    SelfCheck,
}
