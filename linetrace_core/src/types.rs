use crate::config::MAX_SENSORS;

/// Averaged raw readings, one per sensor, in sensor-index order.
pub type SampleSet = heapless::Vec<u16, MAX_SENSORS>;

/// Calibrated readings on the `[0, 1000]` scale, one per sensor.
pub type CalibratedSet = heapless::Vec<u16, MAX_SENSORS>;

/// Everything one tracking step saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub raw: SampleSet,
    pub calibrated: CalibratedSet,
    pub position: crate::position::LinePosition,
}
