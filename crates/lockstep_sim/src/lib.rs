//! LOCKSTEP Order Generation
//!
//! Reproducible ITCH order flow for co-simulation:
//! - Seeded synthetic random-walk generator
//! - Historical CSV price adapter
//! - Generation runs writing the binary stream and an order log

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod record;
pub mod run;
pub mod seed;
pub mod sequence;
pub mod synthetic;
pub mod tabular;

pub use error::{SimError, SimResult};
pub use record::{GeneratedOrder, OrderLog, OrderLogRow};
pub use run::{GenerationRun, GenerationSummary};
pub use seed::{SeedSource, SimSeed};
pub use sequence::OrderSequencer;
pub use synthetic::{DEFAULT_SYMBOLS, LOT_SIZES, SyntheticConfig, SyntheticGenerator};
pub use tabular::{ColumnAliases, DEFAULT_LOT_SIZES, TabularAdapter, alternating_side};
