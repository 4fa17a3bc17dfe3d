//! LOCKSTEP Wire Codec
//!
//! NASDAQ ITCH 5.0 Add Order messages: validated encoding into the fixed
//! 36-byte big-endian layout, decoding, and flat record streams.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod add_order;
pub mod error;
pub mod event;
pub mod side;
pub mod stream;

pub use add_order::{
    ADD_ORDER_LEN, ADD_ORDER_TYPE, AddOrderMessage, EncodedMessage, decode_add_order, encode,
    encode_with_header,
};
pub use error::{WireError, WireResult};
pub use event::{MarketEvent, MessageHeader, SYMBOL_LEN};
pub use side::Side;
pub use stream::{AddOrderReader, AddOrderWriter, StreamSummary};
