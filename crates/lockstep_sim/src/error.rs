//! Generation errors.

use lockstep_core::CoreError;
use lockstep_wire::WireError;

/// Generation result type
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised while producing or writing market events
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// Missing input, I/O or validation failure from the core types
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A source cell could not be turned into an event field
    #[error("Row {row}, column '{column}': {reason}")]
    Field {
        /// 1-based data row
        row: u64,
        /// Source column name
        column: String,
        /// What was wrong with the value
        reason: String,
    },

    /// An event was rejected by the codec
    #[error("Order {order_ref} rejected: {source}")]
    Encode {
        /// Order reference of the rejected event
        order_ref: u64,
        /// Codec error
        source: WireError,
    },

    /// Malformed tabular source
    #[error("CSV error: {0}")]
    Csv(String),

    /// Generator parameters are unusable
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl SimError {
    /// Whether the error means an input file is missing
    #[must_use]
    pub fn is_input_not_found(&self) -> bool {
        matches!(self, Self::Core(err) if err.is_not_found())
    }

    pub(crate) fn field(row: u64, column: &str, reason: impl Into<String>) -> Self {
        Self::Field {
            row,
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<csv::Error> for SimError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}
