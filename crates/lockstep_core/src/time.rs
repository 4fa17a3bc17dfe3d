//! Wire timestamps for LOCKSTEP.
//!
//! ITCH carries nanoseconds since midnight in a 6-byte field, so every
//! timestamp that reaches the codec must fit in 48 bits.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nanosecond timestamp bounded to 48 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Timestamp(u64);

impl Timestamp {
    /// Number of bytes the timestamp occupies on the wire
    pub const WIRE_LEN: usize = 6;

    /// Largest representable value (2^48 - 1)
    pub const MAX_NANOS: u64 = (1 << 48) - 1;

    /// 09:30 ET market open, in nanoseconds since midnight
    pub const MARKET_OPEN: Self = Self(34_200_000_000_000);

    /// Nanoseconds per second
    pub const NANOS_PER_SEC: u64 = 1_000_000_000;

    /// Midnight
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Create from a nanosecond count
    ///
    /// # Errors
    ///
    /// Returns a validation error if the value does not fit in 48 bits
    pub fn from_nanos(nanos: u64) -> CoreResult<Self> {
        if nanos > Self::MAX_NANOS {
            return Err(CoreError::validation(
                "timestamp_ns",
                format!("{} exceeds 48-bit maximum {}", nanos, Self::MAX_NANOS),
            ));
        }
        Ok(Self(nanos))
    }

    /// Get raw nanoseconds
    #[must_use]
    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Advance by `gap_ns`
    ///
    /// # Errors
    ///
    /// Returns a validation error if the result would leave the 48-bit range
    pub fn advance(&mut self, gap_ns: u64) -> CoreResult<()> {
        let next = self.0.checked_add(gap_ns).ok_or_else(|| {
            CoreError::validation("timestamp_ns", "advance overflowed u64".to_string())
        })?;
        *self = Self::from_nanos(next)?;
        Ok(())
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::MARKET_OPEN
    }
}

impl TryFrom<u64> for Timestamp {
    type Error = CoreError;

    fn try_from(nanos: u64) -> CoreResult<Self> {
        Self::from_nanos(nanos)
    }
}

impl From<Timestamp> for u64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0 / Self::NANOS_PER_SEC;
        let nanos = self.0 % Self::NANOS_PER_SEC;
        write!(
            f,
            "{:02}:{:02}:{:02}.{:09}",
            secs / 3600,
            (secs / 60) % 60,
            secs % 60,
            nanos
        )
    }
}
