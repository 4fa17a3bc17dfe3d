//! Historical price records to market events.
//!
//! Column names are matched case-insensitively after trimming. Each logical
//! field has an ordered alias list; the first alias present in the header
//! wins, and the resolution is done once per source.

use crate::error::{SimError, SimResult};
use crate::record::GeneratedOrder;
use crate::seed::SimSeed;
use crate::sequence::OrderSequencer;
use lockstep_core::{CoreError, Timestamp, dollars_to_raw};
use lockstep_wire::{MarketEvent, SYMBOL_LEN, Side};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Quantities drawn when a row carries no share count
pub const DEFAULT_LOT_SIZES: [u64; 5] = [100, 200, 300, 500, 1000];

/// Symbol used when no symbol column exists
pub const DEFAULT_SYMBOL: &str = "AAPL";

/// Dollar price used when no price column exists
pub const DEFAULT_PRICE: f64 = 100.0;

const GAP_NS: (u64, u64) = (100, 10_000);

/// Accepted column names per logical field, in priority order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnAliases {
    /// Ticker column candidates
    pub symbol: Vec<String>,
    /// Dollar price column candidates
    pub price: Vec<String>,
    /// Side column candidates
    pub side: Vec<String>,
    /// Quantity column candidates
    pub shares: Vec<String>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|n| (*n).to_string()).collect();
        Self {
            symbol: owned(&["symbol", "ticker", "stock"]),
            price: owned(&["price", "close", "last"]),
            side: owned(&["side"]),
            shares: owned(&["shares", "volume", "qty"]),
        }
    }
}

/// Header positions of each logical field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ColumnMap {
    symbol: Option<usize>,
    price: Option<usize>,
    side: Option<usize>,
    shares: Option<usize>,
}

impl ColumnMap {
    fn resolve(aliases: &ColumnAliases, header: &[String]) -> Self {
        let find = |candidates: &[String]| {
            candidates
                .iter()
                .find_map(|alias| header.iter().position(|h| h == alias))
        };
        Self {
            symbol: find(&aliases.symbol),
            price: find(&aliases.price),
            side: find(&aliases.side),
            shares: find(&aliases.shares),
        }
    }
}

/// Converts rows of a CSV price file into generated orders
pub struct TabularAdapter<R: Read> {
    reader: csv::Reader<R>,
    header: Vec<String>,
    columns: ColumnMap,
    rng: ChaCha8Rng,
    sequencer: OrderSequencer,
    record: csv::StringRecord,
    row: u64,
    done: bool,
}

impl TabularAdapter<BufReader<File>> {
    /// Open a CSV file
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InputNotFound`] if the file is missing, or a CSV
    /// error if the header cannot be read
    pub fn from_path(path: impl AsRef<Path>, seed: &SimSeed) -> SimResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CoreError::from_io(path, &e))?;
        tracing::info!(path = %path.display(), "reading historical prices");
        Self::from_reader(BufReader::new(file), seed)
    }
}

impl<R: Read> TabularAdapter<R> {
    /// Wrap a reader using the default aliases
    ///
    /// # Errors
    ///
    /// Returns a CSV error if the header cannot be read
    pub fn from_reader(reader: R, seed: &SimSeed) -> SimResult<Self> {
        Self::with_aliases(reader, seed, &ColumnAliases::default())
    }

    /// Wrap a reader using custom aliases
    ///
    /// # Errors
    ///
    /// Returns a CSV error if the header cannot be read
    pub fn with_aliases(reader: R, seed: &SimSeed, aliases: &ColumnAliases) -> SimResult<Self> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let header: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_ascii_lowercase())
            .collect();
        let lowered = ColumnAliases {
            symbol: lower_all(&aliases.symbol),
            price: lower_all(&aliases.price),
            side: lower_all(&aliases.side),
            shares: lower_all(&aliases.shares),
        };
        let columns = ColumnMap::resolve(&lowered, &header);
        tracing::debug!(?columns, "resolved source columns");

        Ok(Self {
            reader,
            header,
            columns,
            rng: seed.derive("tabular").into_rng(),
            sequencer: OrderSequencer::new(Timestamp::MARKET_OPEN),
            record: csv::StringRecord::new(),
            row: 0,
            done: false,
        })
    }

    /// Normalized header names
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    fn convert_row(&mut self) -> SimResult<GeneratedOrder> {
        let row = self.row;
        let order_ref = self.sequencer.peek_ref();
        let (header, record, columns) = (&self.header, &self.record, self.columns);

        let symbol = match cell(header, record, columns.symbol) {
            Some((name, value)) => {
                let symbol = value.to_ascii_uppercase();
                if symbol.is_empty() || symbol.len() > SYMBOL_LEN {
                    return Err(SimError::field(
                        row,
                        name,
                        format!("symbol '{}' must be 1-{} characters", symbol, SYMBOL_LEN),
                    ));
                }
                symbol
            }
            None => DEFAULT_SYMBOL.to_string(),
        };

        let (price_dollars, price_raw) = match cell(header, record, columns.price) {
            Some((name, value)) => {
                let dollars = value
                    .parse::<f64>()
                    .map_err(|_| SimError::field(row, name, format!("'{}' is not a price", value)))?;
                let raw = dollars_to_raw(dollars).map_err(|e| SimError::field(row, name, e.to_string()))?;
                (dollars, raw)
            }
            None => (DEFAULT_PRICE, dollars_to_raw(DEFAULT_PRICE)?),
        };

        let side = match cell(header, record, columns.side) {
            Some((_, "")) | None => alternating_side(order_ref),
            Some((name, value)) => value
                .to_ascii_uppercase()
                .parse::<Side>()
                .map_err(|e| SimError::field(row, name, e.to_string()))?,
        };

        let shares = match cell(header, record, columns.shares) {
            Some((_, "")) | None => DEFAULT_LOT_SIZES[self.rng.gen_range(0..DEFAULT_LOT_SIZES.len())],
            Some((name, value)) => parse_quantity(value)
                .ok_or_else(|| SimError::field(row, name, format!("'{}' is not a quantity", value)))?,
        };

        let gap = self.rng.gen_range(GAP_NS.0..=GAP_NS.1);
        let (order_ref, timestamp) = self.sequencer.next(gap)?;

        Ok(GeneratedOrder {
            event: MarketEvent {
                timestamp_ns: timestamp.as_nanos(),
                order_ref,
                side,
                shares,
                symbol,
                price_raw,
            },
            price_dollars,
        })
    }
}

impl<R: Read> Iterator for TabularAdapter<R> {
    type Item = SimResult<GeneratedOrder>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record(&mut self.record) {
            Ok(true) => {}
            Ok(false) => {
                self.done = true;
                return None;
            }
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        }
        self.row += 1;

        let order = self.convert_row();
        if order.is_err() {
            self.done = true;
        }
        Some(order)
    }
}

/// Header name and trimmed value of a resolved column
fn cell<'a>(
    header: &'a [String],
    record: &'a csv::StringRecord,
    column: Option<usize>,
) -> Option<(&'a str, &'a str)> {
    let index = column?;
    let name = header.get(index)?;
    Some((name.as_str(), record.get(index).unwrap_or("").trim()))
}

/// Buy for odd order references, sell for even
#[must_use]
pub fn alternating_side(order_ref: u64) -> Side {
    if order_ref % 2 == 1 { Side::Buy } else { Side::Sell }
}

/// Parse a quantity cell, truncating any fractional part
fn parse_quantity(value: &str) -> Option<u64> {
    let quantity = value.parse::<f64>().ok()?;
    if !quantity.is_finite() || quantity < 0.0 || quantity >= u64::MAX as f64 {
        return None;
    }
    Some(quantity.trunc() as u64)
}

fn lower_all(names: &[String]) -> Vec<String> {
    names.iter().map(|n| n.trim().to_ascii_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn adapt(csv: &str) -> Vec<SimResult<GeneratedOrder>> {
        TabularAdapter::from_reader(csv.as_bytes(), &SimSeed::default())
            .unwrap()
            .collect()
    }

    fn events(csv: &str) -> Vec<MarketEvent> {
        adapt(csv).into_iter().map(|o| o.unwrap().event).collect()
    }

    #[test]
    fn test_primary_columns() {
        let orders = events("symbol,price,side,shares\nmsft,410.25,S,300\n");
        assert_eq!(orders.len(), 1);
        let e = &orders[0];
        assert_eq!(e.symbol, "MSFT");
        assert_eq!(e.price_raw, 4_102_500);
        assert_eq!(e.side, Side::Sell);
        assert_eq!(e.shares, 300);
        assert_eq!(e.order_ref, 1);
    }

    #[test]
    fn test_alias_columns_and_header_normalization() {
        let orders = events(" Ticker , Close ,Volume\nnvda,120.5,1500.9\n");
        let e = &orders[0];
        assert_eq!(e.symbol, "NVDA");
        assert_eq!(e.price_raw, 1_205_000);
        assert_eq!(e.shares, 1500);
    }

    #[test]
    fn test_alias_priority() {
        // `symbol` outranks `stock` even when it appears later in the header
        let orders = events("stock,symbol,last,price\nAAA,BBB,1.0,2.0\n");
        assert_eq!(orders[0].symbol, "BBB");
        assert_eq!(orders[0].price_raw, 20_000);
    }

    #[test]
    fn test_side_alternates_when_absent() {
        let orders = events("symbol,price\nA,1\nB,2\nC,3\nD,4\n");
        let sides: Vec<Side> = orders.iter().map(|e| e.side).collect();
        assert_eq!(sides, vec![Side::Buy, Side::Sell, Side::Buy, Side::Sell]);
    }

    #[test]
    fn test_blank_side_alternates() {
        let orders = events("symbol,price,side\nA,1,\nB,2,b\n");
        assert_eq!(orders[0].side, Side::Buy);
        assert_eq!(orders[1].side, Side::Buy);
    }

    #[test]
    fn test_default_lot_sizes() {
        let orders = events("symbol,price\nA,1\nB,2\nC,3\nD,4\nE,5\nF,6\n");
        for e in &orders {
            assert!(DEFAULT_LOT_SIZES.contains(&e.shares));
        }
    }

    #[test]
    fn test_defaults_without_symbol_or_price() {
        let orders = events("side\nB\n");
        assert_eq!(orders[0].symbol, DEFAULT_SYMBOL);
        assert_eq!(orders[0].price_raw, 1_000_000);
    }

    #[test]
    fn test_timestamps_advance() {
        let orders = events("symbol,price\nA,1\nB,2\nC,3\n");
        let mut last = Timestamp::MARKET_OPEN.as_nanos();
        for e in &orders {
            let gap = e.timestamp_ns - last;
            assert!((100..=10_000).contains(&gap));
            last = e.timestamp_ns;
        }
    }

    #[test]
    fn test_price_dollars_preserved() {
        let orders = adapt("symbol,price\nAMD,157.123\n");
        let order = orders[0].as_ref().unwrap();
        assert_relative_eq!(order.price_dollars, 157.123);
        assert_eq!(order.event.price_raw, 1_571_230);
    }

    #[test]
    fn test_long_symbol_rejected_not_truncated() {
        let results = adapt("symbol,price\nOK,1\nWAYTOOLONG,2\nNEVER,3\n");
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        match &results[1] {
            Err(SimError::Field { row, column, .. }) => {
                assert_eq!(*row, 2);
                assert_eq!(column, "symbol");
            }
            other => panic!("expected field error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_price_reports_row_and_column() {
        let results = adapt("ticker,close\nA,abc\n");
        assert_eq!(
            results[0],
            Err(SimError::field(1, "close", "'abc' is not a price"))
        );
    }

    #[test]
    fn test_unknown_side_rejected() {
        let results = adapt("symbol,price,side\nA,1,X\n");
        assert!(matches!(&results[0], Err(SimError::Field { column, .. }) if column == "side"));
    }

    #[test]
    fn test_same_seed_same_events() {
        let csv = "symbol,price\nA,1\nB,2\nC,3\n";
        assert_eq!(events(csv), events(csv));
    }

    #[test]
    fn test_missing_file() {
        let result = TabularAdapter::from_path("/nonexistent/prices.csv", &SimSeed::default());
        assert!(matches!(result, Err(ref e) if e.is_input_not_found()));
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("250"), Some(250));
        assert_eq!(parse_quantity("99.9"), Some(99));
        assert_eq!(parse_quantity("-5"), None);
        assert_eq!(parse_quantity("lots"), None);
    }
}
