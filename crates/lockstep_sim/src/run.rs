//! Generation runs: orders in, binary stream and order log out.

use crate::error::{SimError, SimResult};
use crate::record::{GeneratedOrder, OrderLog};
use lockstep_core::CoreError;
use lockstep_wire::{AddOrderWriter, MessageHeader, StreamSummary, WireError};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Totals of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Binary stream totals
    pub stream: StreamSummary,
    /// Rows written to the order log, zero when no log was requested
    pub logged: u64,
}

/// Destination files for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRun {
    /// Binary Add Order stream
    pub output: PathBuf,
    /// Optional CSV order log
    pub order_log: Option<PathBuf>,
    /// Header stamped on every record
    pub header: MessageHeader,
}

impl GenerationRun {
    /// Write the binary stream to `output`
    #[must_use]
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            order_log: None,
            header: MessageHeader::default(),
        }
    }

    /// Also write a CSV order log
    #[must_use]
    pub fn with_order_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.order_log = Some(path.into());
        self
    }

    /// Set the record header
    #[must_use]
    pub fn with_header(mut self, header: MessageHeader) -> Self {
        self.header = header;
        self
    }

    /// Consume `orders` and write every one of them
    ///
    /// Stops at the first failing order. Records written before the failure
    /// stay in the output file.
    ///
    /// # Errors
    ///
    /// Returns the generator's error, [`SimError::Encode`] for an event the
    /// codec rejects, or an I/O error
    pub fn execute<I>(&self, orders: I) -> SimResult<GenerationSummary>
    where
        I: IntoIterator<Item = SimResult<GeneratedOrder>>,
    {
        let stream_file = create(&self.output)?;
        let mut writer = AddOrderWriter::with_header(BufWriter::new(stream_file), self.header);
        let mut log = match &self.order_log {
            Some(path) => Some(OrderLog::new(BufWriter::new(create(path)?))),
            None => None,
        };

        for order in orders {
            let order = order?;
            writer
                .write_event(&order.event)
                .map_err(|source| self.wire_error(order.event.order_ref, source))?;
            if let Some(log) = log.as_mut() {
                log.append(&order)?;
            }
        }

        let (_, stream) = writer.finish().map_err(|source| self.wire_error(0, source))?;
        let logged = match log {
            Some(log) => log.finish()?,
            None => 0,
        };

        tracing::info!(
            output = %self.output.display(),
            records = stream.records,
            bytes = stream.bytes,
            digest = %stream.digest,
            "generation complete"
        );
        Ok(GenerationSummary { stream, logged })
    }

    fn wire_error(&self, order_ref: u64, source: WireError) -> SimError {
        match source {
            WireError::Io(reason) => CoreError::Io {
                path: self.output.clone(),
                reason,
            }
            .into(),
            source => SimError::Encode { order_ref, source },
        }
    }
}

fn create(path: &Path) -> SimResult<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CoreError::from_io(parent, &e))?;
    }
    File::create(path).map_err(|e| CoreError::from_io(path, &e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SimSeed;
    use crate::synthetic::{SyntheticConfig, SyntheticGenerator};
    use crate::tabular::TabularAdapter;
    use lockstep_wire::{ADD_ORDER_LEN, AddOrderReader, MarketEvent, Side};
    use tempfile::tempdir;

    fn synthetic(count: u64, seed: u64) -> SyntheticGenerator {
        SyntheticGenerator::new(SyntheticConfig::new(count).with_seed(SimSeed::from_literal(seed)))
            .unwrap()
    }

    #[test]
    fn test_identical_runs_identical_bytes() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");

        let first = GenerationRun::new(&a).execute(synthetic(300, 42)).unwrap();
        let second = GenerationRun::new(&b).execute(synthetic(300, 42)).unwrap();

        assert_eq!(first, second);
        assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
        assert_eq!(first.stream.bytes, 300 * ADD_ORDER_LEN as u64);
    }

    #[test]
    fn test_output_decodes_to_generated_events() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("nested/dir/orders.bin");
        let expected: Vec<MarketEvent> = synthetic(40, 3).map(|o| o.unwrap().event).collect();

        GenerationRun::new(&output).execute(synthetic(40, 3)).unwrap();

        let decoded: Vec<MarketEvent> = AddOrderReader::new(File::open(&output).unwrap())
            .map(|m| m.unwrap().event)
            .collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_order_log_written() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("orders.bin");
        let log = dir.path().join("orders.csv");

        let summary = GenerationRun::new(&output)
            .with_order_log(&log)
            .execute(synthetic(25, 1))
            .unwrap();

        assert_eq!(summary.logged, 25);
        let text = fs::read_to_string(&log).unwrap();
        assert_eq!(text.lines().count(), 26);
    }

    #[test]
    fn test_tabular_run() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("prices.csv");
        fs::write(&source, "symbol,price,side,shares\nAAPL,190.5,B,100\nMSFT,410,S,50\n").unwrap();

        let adapter = TabularAdapter::from_path(&source, &SimSeed::default()).unwrap();
        let summary = GenerationRun::new(dir.path().join("out.bin"))
            .execute(adapter)
            .unwrap();
        assert_eq!(summary.stream.records, 2);
    }

    #[test]
    fn test_rejected_event_reports_order_ref() {
        let dir = tempdir().unwrap();
        let bad = GeneratedOrder {
            event: MarketEvent {
                timestamp_ns: 1,
                order_ref: 9,
                side: Side::Buy,
                shares: u64::from(u32::MAX) + 1,
                symbol: "AAPL".to_string(),
                price_raw: 1,
            },
            price_dollars: 0.0001,
        };

        let result = GenerationRun::new(dir.path().join("bad.bin")).execute(vec![Ok(bad)]);
        assert!(matches!(result, Err(SimError::Encode { order_ref: 9, .. })));
    }

    #[test]
    fn test_generator_error_propagates() {
        let dir = tempdir().unwrap();
        let orders = vec![Err(SimError::Config("broken".to_string()))];
        let result = GenerationRun::new(dir.path().join("x.bin")).execute(orders);
        assert_eq!(result, Err(SimError::Config("broken".to_string())));
    }
}
