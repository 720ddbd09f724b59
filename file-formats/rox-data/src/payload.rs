//! Length-prefixed names and bulk payloads.
//!
//! Names are stored without a terminator; the length field written before them
//! is authoritative. Large arrays (indices, vertices, keyframes) move as one
//! block and are decoded from memory afterwards.

use std::io::Cursor;

use crate::error::{Result, RoxDataError};
use crate::types::{Read, RoxHeaderR, RoxHeaderW, Write};

/// Length prefix for a name, failing when it does not fit in a `u32`.
pub fn name_len(name: &str) -> Result<u32> {
    u32::try_from(name.len()).map_err(|_| RoxDataError::NameTooLong(name.len()))
}

/// Decodes `count` fixed-width records from an in-memory block.
pub fn decode_records<T: RoxHeaderR>(bytes: &[u8], count: usize) -> Result<Vec<T>> {
    let mut cursor = Cursor::new(bytes);
    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        records.push(T::rox_read(&mut cursor)?);
    }
    Ok(records)
}

pub trait RoxPayloadReader: Read + Sized {
    /// Reads exactly `len` bytes. The buffer grows with the data actually
    /// present, so a corrupt length does not trigger a huge allocation.
    fn read_payload(&mut self, len: u64) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.take(len).read_to_end(&mut buf)?;
        if (buf.len() as u64) < len {
            return Err(RoxDataError::PayloadTooShort {
                expected: len as usize,
                actual: buf.len(),
            });
        }
        Ok(buf)
    }

    fn read_name(&mut self, len: u32, context: &'static str) -> Result<String> {
        let bytes = self.read_payload(u64::from(len))?;
        String::from_utf8(bytes).map_err(|source| RoxDataError::InvalidString { context, source })
    }
}
impl<R: Read> RoxPayloadReader for R {}

pub trait RoxPayloadWriter: Write + Sized {
    fn write_name(&mut self, name: &str) -> Result<()> {
        self.write_all(name.as_bytes())?;
        Ok(())
    }

    /// Encodes all records into one buffer and writes it in a single call.
    fn write_records<T: RoxHeaderW>(&mut self, records: &[T]) -> Result<()> {
        let size = records.first().map_or(0, |r| r.rox_size() * records.len());
        let mut buf = Vec::with_capacity(size);
        for record in records {
            record.rox_write(&mut buf)?;
        }
        self.write_all(&buf)?;
        Ok(())
    }
}
impl<W: Write> RoxPayloadWriter for W {}
