//! Maps `Box<dyn Error>` from the trait boundary to a typed `SensorError`.
//!
//! `linetrace_traits` boxes backend errors; this module converts them to our
//! typed error enum, with an optional feature-gated path for
//! `linetrace_hardware::HwError` downcasting.

use crate::error::SensorError;

/// Map a trait-boundary error to a typed `SensorError`.
///
/// Known hardware error types become `HardwareFault`; anything else is kept
/// as its message under `Hardware`.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> SensorError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<linetrace_hardware::HwError>() {
            return SensorError::HardwareFault(hw.to_string());
        }
    }

    SensorError::Hardware(e.to_string())
}
