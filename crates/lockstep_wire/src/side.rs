//! Buy/sell indicator.

use crate::error::{WireError, WireResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order side, encoded on the wire as ASCII `'B'` or `'S'`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Bid
    #[serde(rename = "B")]
    Buy,
    /// Ask
    #[serde(rename = "S")]
    Sell,
}

impl Side {
    /// Wire byte for this side
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Buy => b'B',
            Self::Sell => b'S',
        }
    }

    /// Parse the wire byte
    ///
    /// # Errors
    ///
    /// Returns a field validation error for anything other than `'B'` or `'S'`
    pub fn from_byte(byte: u8) -> WireResult<Self> {
        match byte {
            b'B' => Ok(Self::Buy),
            b'S' => Ok(Self::Sell),
            other => Err(WireError::field(
                "side",
                format!("must be 'B' or 'S', got 0x{:02X}", other),
            )),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_byte() as char)
    }
}

impl FromStr for Side {
    type Err = WireError;

    fn from_str(s: &str) -> WireResult<Self> {
        match s.as_bytes() {
            [byte] => Self::from_byte(*byte),
            _ => Err(WireError::field(
                "side",
                format!("must be 'B' or 'S', got '{}'", s),
            )),
        }
    }
}
