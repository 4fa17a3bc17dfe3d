//! LOCKSTEP Trace Verification
//!
//! Field-by-field comparison of a golden-model trace against a hardware
//! simulation trace, driven by a declarative policy table.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compare;
pub mod error;
pub mod policy;
pub mod trace;
pub mod verdict;

pub use compare::{CompareConfig, DEFAULT_TOLERANCE, TraceComparator};
pub use error::{VerifyError, VerifyResult};
pub use policy::{ACTION_LABELS, EXACT_FIELDS, FieldPolicy, FieldRule, PolicyTable, TOLERANCE_FIELDS};
pub use trace::{GOLDEN_COLUMNS, Trace, TraceRow, UNKNOWN_LABEL};
pub use verdict::{ComparisonVerdict, FieldMismatch, MismatchKind, Outcome, RowMismatch, Warning};
