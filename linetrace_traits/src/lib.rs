//! Hardware boundary for the line-sensor stack.
//!
//! The core never touches pins or ADCs directly; everything goes through
//! [`HardwareChannel`]. Errors cross the boundary boxed so that backends can
//! use whatever error type suits them.

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// One shared analog input fronted by a channel multiplexer.
///
/// - `select_channel()`: route sensor `index` to the shared input. Takes effect
///   before the next `sample_raw()`.
/// - `sample_raw()`: read the currently selected channel.
pub trait HardwareChannel {
    fn select_channel(&mut self, index: u8) -> Result<(), BoxError>;
    fn sample_raw(&mut self) -> Result<u16, BoxError>;
}

impl<T: HardwareChannel + ?Sized> HardwareChannel for Box<T> {
    fn select_channel(&mut self, index: u8) -> Result<(), BoxError> {
        (**self).select_channel(index)
    }

    fn sample_raw(&mut self) -> Result<u16, BoxError> {
        (**self).sample_raw()
    }
}
