//! LOCKSTEP Core Types
//!
//! Pure types shared by the codec, the generators and the verifier.
//! No I/O happens in this crate.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod price;
pub mod time;

// Re-exports
pub use error::{CoreError, CoreResult};
pub use price::{PRICE_DECIMALS, PRICE_SCALE, TICK_SIZE, dollars_to_raw, raw_to_dollars};
pub use time::Timestamp;
