//! Verification errors.

use lockstep_core::CoreError;
use std::path::PathBuf;

/// Verification result type
pub type VerifyResult<T> = Result<T, VerifyError>;

/// Errors raised before a comparison can run
///
/// Disagreements between traces are never errors; they are recorded in the
/// verdict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// Missing trace file or I/O failure
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Trace file is not well-formed CSV
    #[error("Malformed trace {}: {reason}", path.display())]
    Csv {
        /// Trace path
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// Policy table could not be loaded
    #[error("Invalid policy table: {0}")]
    Policy(String),
}

impl VerifyError {
    /// Whether the error means an input file is missing
    #[must_use]
    pub fn is_input_not_found(&self) -> bool {
        matches!(self, Self::Core(err) if err.is_not_found())
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, err: &csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for VerifyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Policy(err.to_string())
    }
}
