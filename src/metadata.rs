//! Asset metadata and its binary layout.
//!
//! Layout, all integers big-endian:
//!
//! | field    | size          |
//! |----------|---------------|
//! | id       | 16            |
//! | owner    | 16            |
//! | mode     | 4             |
//! | mod_time | 8             |
//! | name_len | 2             |
//! | name     | name_len      |

use crate::codec::{self, RecordReader};
use crate::error::StorageError;
use crate::types::Id;
use chrono::{DateTime, TimeZone, Utc};

/// Directory flag in `mode`.
pub const MODE_DIR: u32 = 0x8000_0000;

/// Permission bits in `mode`.
pub const MODE_PERM: u32 = 0o777;

/// Persisted attributes shared by files and folders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub id: Id,
    pub owner: Id,
    pub mode: u32,
    /// Unix timestamp, seconds.
    pub mod_time: i64,
    pub name: String,
}

impl Metadata {
    /// Fresh metadata with a new identifier, no owner, and the current time.
    pub fn new(name: impl Into<String>, mode: u32) -> Self {
        Self {
            id: Id::new(),
            owner: Id::nil(),
            mode,
            mod_time: Utc::now().timestamp(),
            name: name.into(),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.mode & MODE_DIR != 0
    }

    pub fn perm(&self) -> u32 {
        self.mode & MODE_PERM
    }

    /// Replace the permission bits, keeping type bits.
    pub fn set_perm(&mut self, perm: u32) {
        self.mode = (self.mode & !MODE_PERM) | (perm & MODE_PERM);
    }

    pub fn touch(&mut self) {
        self.mod_time = Utc::now().timestamp();
    }

    pub fn modified(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.mod_time, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Append this block to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> Result<(), StorageError> {
        codec::put_id(buf, &self.id);
        codec::put_id(buf, &self.owner);
        codec::put_u32(buf, self.mode);
        codec::put_i64(buf, self.mod_time);
        codec::put_name(buf, &self.name)
    }

    pub fn encode(&self) -> Result<Vec<u8>, StorageError> {
        let mut buf = Vec::with_capacity(46 + self.name.len());
        self.encode_into(&mut buf)?;
        Ok(buf)
    }

    pub(crate) fn decode_from(reader: &mut RecordReader<'_>) -> Result<Self, StorageError> {
        Ok(Self {
            id: reader.id("metadata id")?,
            owner: reader.id("metadata owner")?,
            mode: reader.u32("metadata mode")?,
            mod_time: reader.i64("metadata mod_time")?,
            name: reader.name("metadata name")?,
        })
    }

    /// Decode a standalone metadata block; trailing bytes are rejected.
    pub fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        let mut reader = RecordReader::new(bytes);
        let metadata = Self::decode_from(&mut reader)?;
        reader.finish("metadata")?;
        Ok(metadata)
    }

    /// Read only the mode of an encoded record, to tell files from folders.
    pub(crate) fn peek_mode(bytes: &[u8]) -> Result<u32, StorageError> {
        let mut reader = RecordReader::new(bytes);
        reader.id("metadata id")?;
        reader.id("metadata owner")?;
        reader.u32("metadata mode")
    }
}
