#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and raw-trace parsing for the line-sensor stack.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Raw-trace CSV loader enforces the `s0..sN` header and equal-width rows.
use serde::Deserialize;

/// Upper bound on sensors in one array.
pub const MAX_SENSORS: u8 = 16;
/// Largest calibrated value; thresholds live on this scale.
pub const CALIBRATED_MAX: u16 = 1000;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pins {
    /// BCM numbers of the mux select lines, line 0 first.
    pub select: Vec<u8>,
    /// MCP3008 input wired to the mux common pin.
    pub adc_channel: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            select: vec![17, 27, 22],
            adc_channel: 0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ArrayCfg {
    pub sensor_count: u8,
    /// Largest raw value the ADC can report (1023 for 10 bits).
    #[serde(default = "default_max_raw")]
    pub max_raw: u16,
    /// Sensor → mux select code. Defaults to the SVK board layout.
    #[serde(default)]
    pub channel_map: Option<Vec<u8>>,
}

fn default_max_raw() -> u16 {
    1023
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplingCfg {
    /// Samples averaged per sensor per read. Values above 64 are clamped
    /// by the driver, not rejected.
    pub samples_per_sensor: u32,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            samples_per_sensor: 4,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CalibrationCfg {
    /// When false, calibration passes are skipped entirely.
    pub enabled: bool,
    /// Passes run by `linetrace calibrate` while the array is swept over the line.
    pub passes: u32,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            enabled: true,
            passes: 100,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EstimatorCfg {
    /// A sensor above this calibrated value means the line is under the array.
    pub detect_threshold: u16,
    /// Sensors at or below this calibrated value are left out of the centroid.
    pub noise_threshold: u16,
}

impl Default for EstimatorCfg {
    fn default() -> Self {
        Self {
            detect_threshold: 200,
            noise_threshold: 50,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pins: Pins,
    pub array: ArrayCfg,
    #[serde(default)]
    pub sampling: SamplingCfg,
    #[serde(default)]
    pub calibration: CalibrationCfg,
    #[serde(default)]
    pub estimator: EstimatorCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Array
        if self.array.sensor_count == 0 || self.array.sensor_count > MAX_SENSORS {
            eyre::bail!("array.sensor_count must be in 1..={MAX_SENSORS}");
        }
        if self.array.max_raw == 0 {
            eyre::bail!("array.max_raw must be > 0");
        }
        if let Some(map) = &self.array.channel_map {
            if map.len() != usize::from(self.array.sensor_count) {
                eyre::bail!(
                    "array.channel_map has {} entries but sensor_count is {}",
                    map.len(),
                    self.array.sensor_count
                );
            }
            let mut seen = 0u8;
            for (i, &code) in map.iter().enumerate() {
                if code > 7 {
                    eyre::bail!("array.channel_map[{i}] = {code} does not fit in 3 select lines");
                }
                if seen & (1 << code) != 0 {
                    eyre::bail!("array.channel_map[{i}] = {code} is assigned twice");
                }
                seen |= 1 << code;
            }
        }

        // Estimator
        if self.estimator.detect_threshold > CALIBRATED_MAX
            || self.estimator.noise_threshold > CALIBRATED_MAX
        {
            eyre::bail!("estimator thresholds must be <= {CALIBRATED_MAX}");
        }
        if self.estimator.detect_threshold <= self.estimator.noise_threshold {
            eyre::bail!("estimator.detect_threshold must be > estimator.noise_threshold");
        }

        // Calibration
        if self.calibration.passes == 0 {
            eyre::bail!("calibration.passes must be >= 1");
        }

        // Pins
        if self.pins.select.len() < 3 {
            eyre::bail!("pins.select needs 3 select lines, got {}", self.pins.select.len());
        }
        if self.pins.adc_channel > 7 {
            eyre::bail!("pins.adc_channel must be in 0..=7");
        }

        // Logging
        if let Some(r) = self.logging.rotation.as_deref() {
            if !matches!(r, "never" | "daily" | "hourly") {
                eyre::bail!("logging.rotation must be never, daily or hourly, got '{r}'");
            }
        }

        // Sampling: out-of-range counts are clamped by the driver.

        Ok(())
    }
}

/// Recorded raw frames, one per sweep over the array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    pub frames: Vec<Vec<u16>>,
}

impl Trace {
    pub fn sensor_count(&self) -> usize {
        self.frames.first().map_or(0, Vec::len)
    }
}

/// Parse a raw trace from CSV text.
///
/// Expected headers: `s0,s1,...,s{N-1}`
///
/// Example:
/// s0,s1,s2
/// 80,512,90
/// 85,640,70
pub fn parse_trace<R: std::io::Read>(reader: R) -> eyre::Result<Trace> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read trace CSV headers: {e}"))?
        .clone();
    if headers.is_empty() || headers.len() > usize::from(MAX_SENSORS) {
        eyre::bail!("trace CSV must have 1..={MAX_SENSORS} columns, got {}", headers.len());
    }
    for (i, h) in headers.iter().enumerate() {
        if h != format!("s{i}") {
            eyre::bail!("trace CSV header {i} must be 's{i}', got '{h}'");
        }
    }

    let mut frames = Vec::new();
    for (idx, rec) in rdr.deserialize::<Vec<u16>>().enumerate() {
        match rec {
            Ok(row) if row.len() == headers.len() => frames.push(row),
            Ok(row) => eyre::bail!(
                "trace CSV row {} has {} values, expected {}",
                idx + 2,
                row.len(),
                headers.len()
            ),
            Err(e) => eyre::bail!("invalid trace CSV row {}: {}", idx + 2, e),
        }
    }
    if frames.is_empty() {
        eyre::bail!("trace CSV has no frames");
    }
    Ok(Trace { frames })
}

pub fn load_trace_csv(path: &std::path::Path) -> eyre::Result<Trace> {
    let file = std::fs::File::open(path)
        .map_err(|e| eyre::eyre!("open trace CSV {:?}: {}", path, e))?;
    parse_trace(file)
}
