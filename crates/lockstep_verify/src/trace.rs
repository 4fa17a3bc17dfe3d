//! Trace files: one CSV row per processed order.

use crate::error::{VerifyError, VerifyResult};
use indexmap::IndexMap;
use lockstep_core::CoreError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Label used when a row has no `stock` column
pub const UNKNOWN_LABEL: &str = "?";

/// Column headers written by the golden model
pub const GOLDEN_COLUMNS: [&str; 12] = [
    "order_idx",
    "side",
    "price",
    "shares",
    "stock",
    "best_bid",
    "best_ask",
    "moe_action",
    "moe_confidence",
    "matched",
    "match_price",
    "match_qty",
];

/// Column name to trimmed value, in header order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRow {
    fields: IndexMap<String, String>,
}

impl TraceRow {
    /// Create an empty row
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, trimming both name and value
    #[must_use]
    pub fn with(mut self, field: &str, value: &str) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field, trimming both name and value
    pub fn insert(&mut self, field: &str, value: &str) {
        self.fields
            .insert(field.trim().to_string(), value.trim().to_string());
    }

    /// Value of `field`, if the row carries it
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Display label: the `stock` value or `?`
    #[must_use]
    pub fn label(&self) -> &str {
        self.get("stock").unwrap_or(UNKNOWN_LABEL)
    }

    /// Fields in header order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for TraceRow {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut row = Self::new();
        for (k, v) in iter {
            row.insert(k.as_ref(), v.as_ref());
        }
        row
    }
}

/// A loaded trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    /// Where the trace came from
    pub path: PathBuf,
    /// Trimmed header names
    pub columns: Vec<String>,
    /// Data rows in file order
    pub rows: Vec<TraceRow>,
}

impl Trace {
    /// Load a trace file
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InputNotFound`] for a missing file or
    /// [`VerifyError::Csv`] for malformed content
    pub fn load(path: impl AsRef<Path>) -> VerifyResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| CoreError::from_io(path, &e))?;
        let trace = Self::from_reader(path, BufReader::new(file))?;
        tracing::debug!(
            path = %path.display(),
            rows = trace.rows.len(),
            columns = trace.columns.len(),
            "trace loaded"
        );
        Ok(trace)
    }

    /// Parse a trace from any reader, labelling it with `path`
    ///
    /// Rows shorter than the header simply lack the trailing fields.
    ///
    /// # Errors
    ///
    /// Returns [`VerifyError::Csv`] for malformed content
    pub fn from_reader<R: Read>(path: impl Into<PathBuf>, reader: R) -> VerifyResult<Self> {
        let path = path.into();
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| VerifyError::csv(&path, &e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows: Vec<TraceRow> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| VerifyError::csv(&path, &e))?;
            rows.push(columns.iter().zip(record.iter()).collect());
        }

        Ok(Self {
            path,
            columns,
            rows,
        })
    }

    /// Number of data rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the trace has no data rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
