use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("channel {index} out of range (array has {channels} channels)")]
    ChannelOutOfRange { index: u8, channels: u8 },
    #[error("invalid channel map: {0}")]
    InvalidChannelMap(String),
    #[error("replay trace is empty")]
    EmptyTrace,
}

pub type Result<T> = std::result::Result<T, HwError>;
