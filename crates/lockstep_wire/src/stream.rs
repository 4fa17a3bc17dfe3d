//! Flat record streams.
//!
//! A stream is a plain concatenation of 36-byte Add Order records with no
//! delimiter or length prefix.

use crate::add_order::{ADD_ORDER_LEN, AddOrderMessage, EncodedMessage, decode_add_order, encode_with_header};
use crate::error::{WireError, WireResult};
use crate::event::{MarketEvent, MessageHeader};
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read, Write};

/// Totals for a finished stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSummary {
    /// Records written
    pub records: u64,
    /// Bytes written
    pub bytes: u64,
    /// BLAKE3 digest of every byte written, hex encoded
    pub digest: String,
}

/// Writer that validates and appends Add Order records
pub struct AddOrderWriter<W> {
    writer: W,
    header: MessageHeader,
    records: u64,
    hasher: blake3::Hasher,
}

impl<W: Write> AddOrderWriter<W> {
    /// Create a writer with a zeroed header
    pub fn new(writer: W) -> Self {
        Self::with_header(writer, MessageHeader::default())
    }

    /// Create a writer stamping every record with `header`
    pub fn with_header(writer: W, header: MessageHeader) -> Self {
        Self {
            writer,
            header,
            records: 0,
            hasher: blake3::Hasher::new(),
        }
    }

    /// Encode and append one event
    ///
    /// Nothing is written when validation fails.
    ///
    /// # Errors
    ///
    /// Returns a validation error for out-of-range fields or an I/O error
    pub fn write_event(&mut self, event: &MarketEvent) -> WireResult<EncodedMessage> {
        let message = encode_with_header(event, self.header)?;
        self.write_message(&message)?;
        Ok(message)
    }

    /// Append an already encoded record
    ///
    /// # Errors
    ///
    /// Returns error if the underlying writer fails
    pub fn write_message(&mut self, message: &EncodedMessage) -> WireResult<()> {
        self.writer.write_all(message.as_bytes())?;
        self.hasher.update(message.as_bytes());
        self.records += 1;
        Ok(())
    }

    /// Records written so far
    #[must_use]
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Bytes written so far
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.records * ADD_ORDER_LEN as u64
    }

    /// Flush and return the inner writer with the stream totals
    ///
    /// # Errors
    ///
    /// Returns error if flushing fails
    pub fn finish(mut self) -> WireResult<(W, StreamSummary)> {
        self.writer.flush()?;
        let summary = StreamSummary {
            records: self.records,
            bytes: self.bytes_written(),
            digest: self.hasher.finalize().to_hex().to_string(),
        };
        tracing::debug!(records = summary.records, digest = %summary.digest, "stream finished");
        Ok((self.writer, summary))
    }
}

/// Reader over a flat sequence of Add Order records
pub struct AddOrderReader<R> {
    reader: R,
    offset: u64,
}

impl<R: Read> AddOrderReader<R> {
    /// Create a reader
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    /// Byte offset of the next record
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read the next raw record
    ///
    /// Returns `Ok(None)` at a clean end of stream.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::PartialRecord`] if the stream ends mid-record, or
    /// a decode error if the record is malformed
    pub fn next_record(&mut self) -> WireResult<Option<EncodedMessage>> {
        let mut record = [0u8; ADD_ORDER_LEN];
        let mut filled = 0;
        while filled < ADD_ORDER_LEN {
            match self.reader.read(&mut record[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled == 0 {
            return Ok(None);
        }
        if filled < ADD_ORDER_LEN {
            return Err(WireError::PartialRecord {
                offset: self.offset,
                len: filled,
            });
        }

        let message = EncodedMessage::try_from(&record[..])?;
        self.offset += ADD_ORDER_LEN as u64;
        Ok(Some(message))
    }

    /// Read and decode the next record
    ///
    /// # Errors
    ///
    /// See [`AddOrderReader::next_record`]
    pub fn next_message(&mut self) -> WireResult<Option<AddOrderMessage>> {
        match self.next_record()? {
            Some(record) => decode_add_order(record.as_bytes()).map(Some),
            None => Ok(None),
        }
    }
}

impl<R: Read> Iterator for AddOrderReader<R> {
    type Item = WireResult<AddOrderMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_message().transpose()
    }
}
