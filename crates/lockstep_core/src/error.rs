//! Core error types for LOCKSTEP.

use std::path::PathBuf;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Trace or source file is missing
    #[error("Input not found: {}", path.display())]
    InputNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// A field violates an encoding constraint
    #[error("Validation failed for {field}: {reason}")]
    Validation {
        /// Field name
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// A field could not be parsed as the expected type
    #[error("Parse error for {field}: {reason}")]
    Parse {
        /// Field name
        field: String,
        /// Why parsing failed
        reason: String,
    },

    /// I/O failure on a named path
    #[error("I/O error on {}: {reason}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error message
        reason: String,
    },
}

impl CoreError {
    /// Build a validation error
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Build a parse error
    #[must_use]
    pub fn parse(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Map an I/O error on `path`, turning `NotFound` into [`CoreError::InputNotFound`]
    #[must_use]
    pub fn from_io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        let path = path.into();
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::InputNotFound { path }
        } else {
            Self::Io {
                path,
                reason: err.to_string(),
            }
        }
    }

    /// Whether this error means the input could not be located
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InputNotFound { .. })
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::parse("json", err.to_string())
    }
}
