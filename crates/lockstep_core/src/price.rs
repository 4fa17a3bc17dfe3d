//! Fixed-point prices with four implied decimal places.

use crate::error::{CoreError, CoreResult};

/// Implied decimal places in a wire price
pub const PRICE_DECIMALS: u32 = 4;

/// Multiplier from dollars to wire units ($10.00 = 100000)
pub const PRICE_SCALE: u64 = 10u64.pow(PRICE_DECIMALS);

/// Minimum quoted price increment in dollars
pub const TICK_SIZE: f64 = 0.01;

/// Convert a dollar price to raw wire units, rounding to the nearest unit
///
/// The result is not range-checked against the 32-bit wire field; the codec
/// does that so an oversized price is rejected rather than wrapped.
///
/// # Errors
///
/// Returns a validation error for negative, non-finite, or u64-overflowing input
pub fn dollars_to_raw(dollars: f64) -> CoreResult<u64> {
    if !dollars.is_finite() {
        return Err(CoreError::validation("price", format!("{} is not finite", dollars)));
    }
    if dollars < 0.0 {
        return Err(CoreError::validation("price", format!("{} is negative", dollars)));
    }
    let scaled = (dollars * PRICE_SCALE as f64).round();
    if scaled >= u64::MAX as f64 {
        return Err(CoreError::validation(
            "price",
            format!("{} overflows the raw price range", dollars),
        ));
    }
    Ok(scaled as u64)
}

/// Convert raw wire units back to dollars
#[must_use]
pub fn raw_to_dollars(raw: u64) -> f64 {
    raw as f64 / PRICE_SCALE as f64
}
