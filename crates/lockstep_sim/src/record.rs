//! Generated orders and the human-readable order log.

use crate::error::{SimError, SimResult};
use lockstep_wire::{MarketEvent, Side};
use serde::{Deserialize, Serialize};
use std::io::Write;

/// An event plus the dollar price it was derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedOrder {
    /// Event to encode
    pub event: MarketEvent,
    /// Dollar price before scaling
    pub price_dollars: f64,
}

/// One row of the order log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLogRow {
    /// Order reference
    pub order_ref: u64,
    /// Nanoseconds since midnight
    pub timestamp_ns: u64,
    /// 'B' or 'S'
    pub side: Side,
    /// Share count
    pub shares: u64,
    /// Ticker
    pub stock: String,
    /// Scaled price
    pub price_raw: u64,
    /// Dollar price
    pub price_dollars: f64,
}

impl From<&GeneratedOrder> for OrderLogRow {
    fn from(order: &GeneratedOrder) -> Self {
        let e = &order.event;
        Self {
            order_ref: e.order_ref,
            timestamp_ns: e.timestamp_ns,
            side: e.side,
            shares: e.shares,
            stock: e.symbol.clone(),
            price_raw: e.price_raw,
            price_dollars: order.price_dollars,
        }
    }
}

/// CSV log written alongside a binary stream
pub struct OrderLog<W: Write> {
    writer: csv::Writer<W>,
    rows: u64,
}

impl<W: Write> OrderLog<W> {
    /// Create a log; the header is written with the first row
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
            rows: 0,
        }
    }

    /// Append one order
    ///
    /// # Errors
    ///
    /// Returns error if serialization or the underlying writer fails
    pub fn append(&mut self, order: &GeneratedOrder) -> SimResult<()> {
        self.writer.serialize(OrderLogRow::from(order))?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far
    #[must_use]
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Flush and return the row count
    ///
    /// # Errors
    ///
    /// Returns error if flushing fails
    pub fn finish(mut self) -> SimResult<u64> {
        self.writer
            .flush()
            .map_err(|e| SimError::Csv(e.to_string()))?;
        Ok(self.rows)
    }
}
