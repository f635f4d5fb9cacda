//! Sensor index → multiplexer select-code mapping.
//!
//! A 3-line analog multiplexer routes one of eight inputs to its common pin.
//! Which input a given sensor lands on depends on board routing, so the map is
//! data rather than a hardwired constant.

use crate::error::{HwError, Result};

/// Number of select lines driven per channel switch.
pub const SELECT_LINES: usize = 3;
/// Inputs addressable with [`SELECT_LINES`] lines.
pub const MAX_MUX_CHANNELS: usize = 1 << SELECT_LINES;

/// A 3-bit select code. Bit `k` drives select line `k`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectCode(u8);

impl SelectCode {
    /// Returns `None` when `bits` does not fit in [`SELECT_LINES`] bits.
    pub const fn new(bits: u8) -> Option<Self> {
        if (bits as usize) < MAX_MUX_CHANNELS {
            Some(Self(bits))
        } else {
            None
        }
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Level for select line `line` (true = high).
    #[inline]
    pub const fn line(self, line: usize) -> bool {
        (self.0 >> line) & 0x01 == 1
    }
}

/// Ordered sensor → select-code table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelMap {
    codes: heapless::Vec<SelectCode, MAX_MUX_CHANNELS>,
}

impl ChannelMap {
    /// Layout of the SVK 8-channel IR board.
    pub const SVK_LAYOUT: [u8; 8] = [0b110, 0b111, 0b011, 0b010, 0b001, 0b100, 0b000, 0b101];

    /// The SVK board routing for all eight sensors.
    pub fn svk() -> Self {
        Self {
            codes: Self::SVK_LAYOUT
                .iter()
                .map(|&b| SelectCode(b))
                .collect(),
        }
    }

    /// Straight-through routing: sensor `i` on mux input `i`.
    pub fn identity(channels: usize) -> Result<Self> {
        if channels == 0 || channels > MAX_MUX_CHANNELS {
            return Err(HwError::InvalidChannelMap(format!(
                "identity map needs 1..={MAX_MUX_CHANNELS} channels, got {channels}"
            )));
        }
        Ok(Self {
            codes: (0..channels as u8).map(SelectCode).collect(),
        })
    }

    /// Build from raw codes. Rejects empty maps, codes wider than three bits
    /// and two sensors sharing one mux input.
    pub fn from_codes(codes: &[u8]) -> Result<Self> {
        if codes.is_empty() {
            return Err(HwError::InvalidChannelMap("no channels".into()));
        }
        if codes.len() > MAX_MUX_CHANNELS {
            return Err(HwError::InvalidChannelMap(format!(
                "{} channels exceed the {MAX_MUX_CHANNELS} mux inputs",
                codes.len()
            )));
        }
        let mut seen = 0u8;
        let mut out = heapless::Vec::new();
        for (i, &bits) in codes.iter().enumerate() {
            let code = SelectCode::new(bits).ok_or_else(|| {
                HwError::InvalidChannelMap(format!("code {bits:#05b} at sensor {i} is wider than 3 bits"))
            })?;
            if seen & (1 << bits) != 0 {
                return Err(HwError::InvalidChannelMap(format!(
                    "code {bits:#05b} at sensor {i} is already assigned"
                )));
            }
            seen |= 1 << bits;
            // Length checked above.
            let _ = out.push(code);
        }
        Ok(Self { codes: out })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Select code for sensor `index`, if mapped.
    #[inline]
    pub fn code(&self, index: u8) -> Option<SelectCode> {
        self.codes.get(usize::from(index)).copied()
    }

    /// First `channels` entries of this map.
    pub fn truncated(&self, channels: usize) -> Result<Self> {
        if channels == 0 || channels > self.codes.len() {
            return Err(HwError::InvalidChannelMap(format!(
                "cannot take {channels} channels from a {}-channel map",
                self.codes.len()
            )));
        }
        Ok(Self {
            codes: self.codes.iter().take(channels).copied().collect(),
        })
    }
}

impl Default for ChannelMap {
    fn default() -> Self {
        Self::svk()
    }
}
