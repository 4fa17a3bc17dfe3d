//! ITCH 5.0 Add Order ('A') record layout.
//!
//! All integers are big-endian at fixed offsets:
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 1 | message type `0x41` |
//! | 1 | 2 | stock locate |
//! | 3 | 2 | tracking number |
//! | 5 | 6 | timestamp (ns since midnight) |
//! | 11 | 8 | order reference |
//! | 19 | 1 | side `'B'` / `'S'` |
//! | 20 | 4 | shares |
//! | 24 | 8 | symbol, space padded |
//! | 32 | 4 | price, 4 implied decimals |

use crate::error::{WireError, WireResult};
use crate::event::{MarketEvent, MessageHeader, SYMBOL_LEN};
use crate::side::Side;
use bytes::{Buf, BufMut};
use lockstep_core::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message type byte for Add Order
pub const ADD_ORDER_TYPE: u8 = b'A';

/// Total record length in bytes
pub const ADD_ORDER_LEN: usize = 36;

/// A decoded Add Order record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOrderMessage {
    /// Locate and tracking fields
    pub header: MessageHeader,
    /// Event payload
    pub event: MarketEvent,
}

/// One encoded 36-byte Add Order record
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedMessage([u8; ADD_ORDER_LEN]);

impl EncodedMessage {
    /// Borrow the raw record
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADD_ORDER_LEN] {
        &self.0
    }

    /// Hex rendering of the record
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode this record
    ///
    /// # Errors
    ///
    /// Returns error if the record is not a well-formed Add Order
    pub fn decode(&self) -> WireResult<AddOrderMessage> {
        decode_add_order(&self.0)
    }
}

impl AsRef<[u8]> for EncodedMessage {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for EncodedMessage {
    type Error = WireError;

    fn try_from(data: &[u8]) -> WireResult<Self> {
        // Validate the content so an EncodedMessage is always decodable
        decode_add_order(data)?;
        let mut record = [0u8; ADD_ORDER_LEN];
        record.copy_from_slice(&data[..ADD_ORDER_LEN]);
        Ok(Self(record))
    }
}

impl fmt::Debug for EncodedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncodedMessage").field(&self.to_hex()).finish()
    }
}

/// Encode an event with a zeroed header
///
/// # Errors
///
/// Returns [`WireError::FieldValidation`] if any field is out of range
pub fn encode(event: &MarketEvent) -> WireResult<EncodedMessage> {
    encode_with_header(event, MessageHeader::default())
}

/// Encode an event with caller-supplied locate and tracking numbers
///
/// Validation completes before any byte is produced.
///
/// # Errors
///
/// Returns [`WireError::FieldValidation`] if any field is out of range
pub fn encode_with_header(event: &MarketEvent, header: MessageHeader) -> WireResult<EncodedMessage> {
    let timestamp = Timestamp::from_nanos(event.timestamp_ns)?;
    let shares = event.shares_u32()?;
    let price = event.price_u32()?;
    let symbol = event.symbol_bytes()?;

    let mut record = [0u8; ADD_ORDER_LEN];
    let mut buf = &mut record[..];
    buf.put_u8(ADD_ORDER_TYPE);
    buf.put_u16(header.stock_locate);
    buf.put_u16(header.tracking_number);
    buf.put_uint(timestamp.as_nanos(), Timestamp::WIRE_LEN);
    buf.put_u64(event.order_ref);
    buf.put_u8(event.side.as_byte());
    buf.put_u32(shares);
    buf.put_slice(&symbol);
    buf.put_u32(price);
    debug_assert_eq!(buf.remaining_mut(), 0);

    Ok(EncodedMessage(record))
}

/// Decode one Add Order record from the front of `data`
///
/// Bytes beyond the first record are ignored.
///
/// # Errors
///
/// Returns error for a short buffer, a different message type, an invalid
/// side byte, or a non-ASCII symbol
pub fn decode_add_order(data: &[u8]) -> WireResult<AddOrderMessage> {
    if data.is_empty() {
        return Err(WireError::Truncated {
            available: 0,
            required: ADD_ORDER_LEN,
        });
    }
    if data[0] != ADD_ORDER_TYPE {
        return Err(WireError::UnexpectedType { found: data[0] });
    }
    if data.len() < ADD_ORDER_LEN {
        return Err(WireError::Truncated {
            available: data.len(),
            required: ADD_ORDER_LEN,
        });
    }

    let mut buf = &data[1..ADD_ORDER_LEN];
    let stock_locate = buf.get_u16();
    let tracking_number = buf.get_u16();
    let timestamp_ns = buf.get_uint(Timestamp::WIRE_LEN);
    let order_ref = buf.get_u64();
    let side = Side::from_byte(buf.get_u8())?;
    let shares = buf.get_u32();
    let mut symbol = [0u8; SYMBOL_LEN];
    buf.copy_to_slice(&mut symbol);
    let price = buf.get_u32();

    if !symbol.is_ascii() {
        return Err(WireError::field("symbol", "contains non-ASCII bytes"));
    }
    let symbol = String::from_utf8_lossy(&symbol).trim_end_matches(' ').to_string();

    Ok(AddOrderMessage {
        header: MessageHeader::new(stock_locate, tracking_number),
        event: MarketEvent {
            timestamp_ns,
            order_ref,
            side,
            shares: u64::from(shares),
            symbol,
            price_raw: u64::from(price),
        },
    })
}
