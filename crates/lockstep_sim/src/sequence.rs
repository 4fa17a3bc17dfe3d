//! Per-run order reference and timestamp counters.

use lockstep_core::{CoreResult, Timestamp};

/// Hands out order references and advances the event clock for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSequencer {
    next_ref: u64,
    clock: Timestamp,
}

impl OrderSequencer {
    /// Start a sequence at `start`; the first order reference is 1
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            next_ref: 1,
            clock: start,
        }
    }

    /// Order reference the next event will receive
    #[must_use]
    pub fn peek_ref(&self) -> u64 {
        self.next_ref
    }

    /// Current clock value
    #[must_use]
    pub fn clock(&self) -> Timestamp {
        self.clock
    }

    /// Advance the clock by `gap_ns` and claim the next order reference
    ///
    /// # Errors
    ///
    /// Returns a validation error if the clock would leave the 48-bit range;
    /// the sequence is left untouched in that case
    pub fn next(&mut self, gap_ns: u64) -> CoreResult<(u64, Timestamp)> {
        self.clock.advance(gap_ns)?;
        let order_ref = self.next_ref;
        self.next_ref += 1;
        Ok((order_ref, self.clock))
    }
}

impl Default for OrderSequencer {
    fn default() -> Self {
        Self::new(Timestamp::MARKET_OPEN)
    }
}
