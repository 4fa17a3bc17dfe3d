//! Market events prior to encoding.

use crate::error::{WireError, WireResult};
use crate::side::Side;
use lockstep_core::Timestamp;
use serde::{Deserialize, Serialize};

/// Width of the symbol field on the wire
pub const SYMBOL_LEN: usize = 8;

/// One order-entry event
///
/// Numeric fields are carried wider than their wire representation so that
/// out-of-range values reach [`MarketEvent::validate`] and get rejected
/// instead of wrapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent {
    /// Nanoseconds since midnight; must fit in 48 bits
    pub timestamp_ns: u64,
    /// Order reference, unique within a generation run
    pub order_ref: u64,
    /// Buy or sell
    pub side: Side,
    /// Share count; must fit in 32 bits
    pub shares: u64,
    /// Ticker, 1-8 printable ASCII characters without spaces
    pub symbol: String,
    /// Price with four implied decimals; must fit in 32 bits
    pub price_raw: u64,
}

impl MarketEvent {
    /// Check every field against its wire constraint
    ///
    /// # Errors
    ///
    /// Returns [`WireError::FieldValidation`] naming the first offending field
    pub fn validate(&self) -> WireResult<()> {
        Timestamp::from_nanos(self.timestamp_ns)?;
        self.shares_u32()?;
        self.price_u32()?;
        self.symbol_bytes()?;
        Ok(())
    }

    pub(crate) fn shares_u32(&self) -> WireResult<u32> {
        u32::try_from(self.shares).map_err(|_| {
            WireError::field("shares", format!("{} exceeds u32 range", self.shares))
        })
    }

    pub(crate) fn price_u32(&self) -> WireResult<u32> {
        u32::try_from(self.price_raw).map_err(|_| {
            WireError::field("price_raw", format!("{} exceeds u32 range", self.price_raw))
        })
    }

    /// Symbol right-padded with spaces to the wire width
    pub(crate) fn symbol_bytes(&self) -> WireResult<[u8; SYMBOL_LEN]> {
        let symbol = self.symbol.as_bytes();
        if symbol.is_empty() {
            return Err(WireError::field("symbol", "must not be empty"));
        }
        if symbol.len() > SYMBOL_LEN {
            return Err(WireError::field(
                "symbol",
                format!("'{}' is longer than {} characters", self.symbol, SYMBOL_LEN),
            ));
        }
        if !symbol.iter().all(|b| b.is_ascii_graphic()) {
            return Err(WireError::field(
                "symbol",
                format!("'{}' must be printable ASCII without spaces", self.symbol),
            ));
        }

        let mut padded = [b' '; SYMBOL_LEN];
        padded[..symbol.len()].copy_from_slice(symbol);
        Ok(padded)
    }
}

/// Per-message routing fields that precede the timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    /// Index into the stock directory
    pub stock_locate: u16,
    /// Tracking number
    pub tracking_number: u16,
}

impl MessageHeader {
    /// Create a header
    #[must_use]
    pub const fn new(stock_locate: u16, tracking_number: u16) -> Self {
        Self {
            stock_locate,
            tracking_number,
        }
    }
}
