//! Binary record primitives
//!
//! Fixed-width big-endian integers, raw identifiers, and strings carrying a
//! 16-bit length prefix. Reads fail with `CorruptRecord` on truncation.

use crate::error::StorageError;
use crate::types::{Id, ID_LEN};

pub(crate) fn put_id(buf: &mut Vec<u8>, id: &Id) {
    buf.extend_from_slice(id.as_bytes());
}

pub(crate) fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

pub(crate) fn put_i64(buf: &mut Vec<u8>, value: i64) {
    buf.extend_from_slice(&value.to_be_bytes());
}

/// Append a length-prefixed string; rejects anything longer than `u16::MAX` bytes.
pub(crate) fn put_name(buf: &mut Vec<u8>, name: &str) -> Result<(), StorageError> {
    let len = u16::try_from(name.len()).map_err(|_| StorageError::NameTooLong(name.len()))?;
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(name.as_bytes());
    Ok(())
}

/// Cursor over an encoded record.
pub(crate) struct RecordReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> RecordReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], StorageError> {
        if self.remaining() < len {
            return Err(StorageError::CorruptRecord(format!(
                "truncated {} at offset {}: need {} bytes, have {}",
                what,
                self.pos,
                len,
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn id(&mut self, what: &str) -> Result<Id, StorageError> {
        let bytes = self.take(ID_LEN, what)?;
        Id::from_slice(bytes)
    }

    pub fn u8(&mut self, what: &str) -> Result<u8, StorageError> {
        Ok(self.take(1, what)?[0])
    }

    pub fn u16(&mut self, what: &str) -> Result<u16, StorageError> {
        let bytes = self.take(2, what)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn u32(&mut self, what: &str) -> Result<u32, StorageError> {
        let bytes = self.take(4, what)?;
        let mut raw = [0u8; 4];
        raw.copy_from_slice(bytes);
        Ok(u32::from_be_bytes(raw))
    }

    pub fn i64(&mut self, what: &str) -> Result<i64, StorageError> {
        let bytes = self.take(8, what)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(i64::from_be_bytes(raw))
    }

    /// Read a length-prefixed name. Names must be UTF-8 and never contain `/`.
    pub fn name(&mut self, what: &str) -> Result<String, StorageError> {
        let len = self.u16(what)? as usize;
        let bytes = self.take(len, what)?;
        let name = std::str::from_utf8(bytes).map_err(|e| {
            StorageError::CorruptRecord(format!("{} is not valid UTF-8: {}", what, e))
        })?;
        if name.contains('/') {
            return Err(StorageError::CorruptRecord(format!(
                "{} contains '/': {:?}",
                what, name
            )));
        }
        Ok(name.to_string())
    }

    pub fn finish(&self, what: &str) -> Result<(), StorageError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(StorageError::CorruptRecord(format!(
                "{} has {} trailing bytes",
                what,
                self.remaining()
            )))
        }
    }
}
