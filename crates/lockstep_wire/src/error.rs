//! Codec errors.

use lockstep_core::CoreError;

/// Codec result type
pub type WireResult<T> = Result<T, WireError>;

/// Errors raised while encoding or decoding Add Order records
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// An event field violates an encoding constraint
    #[error("Field validation failed for {field}: {reason}")]
    FieldValidation {
        /// Offending field
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// First byte is not the Add Order type
    #[error("Unexpected message type 0x{found:02X}, expected 0x41")]
    UnexpectedType {
        /// Type byte that was found
        found: u8,
    },

    /// Buffer shorter than one record
    #[error("Truncated record: {available} bytes available, {required} required")]
    Truncated {
        /// Bytes present
        available: usize,
        /// Bytes needed
        required: usize,
    },

    /// Stream ended in the middle of a record
    #[error("Partial record of {len} bytes at byte offset {offset}")]
    PartialRecord {
        /// Offset of the partial record
        offset: u64,
        /// Bytes read before end of stream
        len: usize,
    },

    /// Underlying reader or writer failed
    #[error("I/O error: {0}")]
    Io(String),
}

impl WireError {
    /// Build a field validation error
    #[must_use]
    pub fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FieldValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<CoreError> for WireError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, reason } | CoreError::Parse { field, reason } => {
                Self::FieldValidation { field, reason }
            }
            other => Self::Io(other.to_string()),
        }
    }
}

impl From<std::io::Error> for WireError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
