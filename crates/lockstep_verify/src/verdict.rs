//! Comparison results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a field disagreed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchKind {
    /// Trimmed strings differ
    Exact {
        /// Golden value
        golden: String,
        /// Hardware value
        hardware: String,
    },
    /// Floats differ by more than the tolerance
    Tolerance {
        /// Golden value
        golden: f64,
        /// Hardware value
        hardware: f64,
        /// Absolute difference
        delta: f64,
        /// Tolerance in force
        tolerance: f64,
    },
    /// Category codes differ; labels when known, else the code
    Categorical {
        /// Golden category
        golden: String,
        /// Hardware category
        hardware: String,
    },
    /// One side could not be parsed as a number
    ParseError {
        /// Raw golden value
        golden: String,
        /// Raw hardware value
        hardware: String,
    },
}

/// One field that disagreed in one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMismatch {
    /// Column name
    pub field: String,
    /// Details
    pub kind: MismatchKind,
}

impl fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = &self.field;
        match &self.kind {
            MismatchKind::Exact { golden, hardware }
            | MismatchKind::Categorical { golden, hardware } => {
                write!(f, "{}: golden={} hw={}", field, golden, hardware)
            }
            MismatchKind::Tolerance {
                golden,
                hardware,
                delta,
                tolerance,
            } => write!(
                f,
                "{}: golden={:.6} hw={:.6} (delta={:.6} > tol={})",
                field, golden, hardware, delta, tolerance
            ),
            MismatchKind::ParseError { golden, hardware } => {
                write!(f, "{}: parse error (g='{}' h='{}')", field, golden, hardware)
            }
        }
    }
}

/// All disagreements of one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowMismatch {
    /// 0-based row position
    pub index: usize,
    /// `stock` value of the golden row, or `?`
    pub label: String,
    /// Failing fields in policy order
    pub fields: Vec<FieldMismatch>,
}

/// Non-fatal observations made during a comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Warning {
    /// Traces have different lengths; only the overlap was compared
    RowCountMismatch {
        /// Golden rows
        golden: usize,
        /// Hardware rows
        hardware: usize,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowCountMismatch { golden, hardware } => write!(
                f,
                "Row count mismatch: golden has {} rows, hardware has {} rows",
                golden, hardware
            ),
        }
    }
}

/// Overall result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Rows were compared and none failed
    Pass,
    /// At least one row failed
    Fail,
    /// Nothing overlapped
    NoData,
}

/// Summary of a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonVerdict {
    /// Rows compared
    pub total: usize,
    /// Rows with no mismatching field
    pub passed: usize,
    /// Rows with at least one mismatching field
    pub failed: usize,
    /// Failing rows, ascending by index
    pub mismatches: Vec<RowMismatch>,
    /// Non-fatal observations
    pub warnings: Vec<Warning>,
    /// Float tolerance used
    pub tolerance: f64,
}

impl ComparisonVerdict {
    /// Derive the outcome from the counts
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        if self.total == 0 {
            Outcome::NoData
        } else if self.failed == 0 {
            Outcome::Pass
        } else {
            Outcome::Fail
        }
    }

    /// Whether the comparison passed
    #[must_use]
    pub fn is_pass(&self) -> bool {
        self.outcome() == Outcome::Pass
    }

    /// Percentage of compared rows that failed
    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.failed as f64 / self.total as f64 * 100.0
        }
    }
}
