//! Folder records
//!
//! A folder is its metadata block followed by zero or more entry blocks:
//! `{child id: 16, name_len: 2, name, is_folder: 1}`. Entries reference
//! children by identifier only; children are separate records.

use crate::codec::{self, RecordReader};
use crate::error::StorageError;
use crate::metadata::{Metadata, MODE_DIR, MODE_PERM};
use crate::store::Storable;
use crate::types::Id;
use std::collections::BTreeMap;

/// A folder's link to one child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderEntry {
    pub id: Id,
    /// Authoritative for lookup; kept equal to the child's own name.
    pub name: String,
    pub is_folder: bool,
}

impl FolderEntry {
    pub fn new(id: Id, name: impl Into<String>, is_folder: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_folder,
        }
    }

    pub fn kind(&self) -> &'static str {
        if self.is_folder {
            "folder"
        } else {
            "file"
        }
    }

    fn encode_into(&self, buf: &mut Vec<u8>) -> Result<(), StorageError> {
        codec::put_id(buf, &self.id);
        codec::put_name(buf, &self.name)?;
        buf.push(u8::from(self.is_folder));
        Ok(())
    }

    fn decode_from(reader: &mut RecordReader<'_>) -> Result<Self, StorageError> {
        let id = reader.id("entry id")?;
        let name = reader.name("entry name")?;
        let is_folder = match reader.u8("entry flag")? {
            0 => false,
            1 => true,
            other => {
                return Err(StorageError::CorruptRecord(format!(
                    "entry {:?} has invalid folder flag {}",
                    name, other
                )))
            }
        };
        Ok(Self {
            id,
            name,
            is_folder,
        })
    }
}

/// Folder: metadata plus child entries keyed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub metadata: Metadata,
    entries: BTreeMap<String, FolderEntry>,
}

impl Folder {
    pub fn new(name: impl Into<String>, perm: u32) -> Self {
        Self {
            metadata: Metadata::new(name, MODE_DIR | (perm & MODE_PERM)),
            entries: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> Id {
        self.metadata.id
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn entry(&self, name: &str) -> Option<&FolderEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = &FolderEntry> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add an entry under its own name. Returns false (and changes nothing) on collision.
    pub(crate) fn link(&mut self, entry: FolderEntry) -> bool {
        if self.entries.contains_key(&entry.name) {
            return false;
        }
        self.entries.insert(entry.name.clone(), entry);
        true
    }

    pub(crate) fn unlink(&mut self, name: &str) -> Option<FolderEntry> {
        self.entries.remove(name)
    }
}

impl Storable for Folder {
    fn id(&self) -> Id {
        self.metadata.id
    }

    fn encode(&self) -> Result<Vec<u8>, StorageError> {
        let mut buf = Vec::new();
        self.metadata.encode_into(&mut buf)?;
        for entry in self.entries.values() {
            entry.encode_into(&mut buf)?;
        }
        Ok(buf)
    }

    fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        let mut reader = RecordReader::new(bytes);
        let metadata = Metadata::decode_from(&mut reader)?;
        if !metadata.is_dir() {
            return Err(StorageError::CorruptRecord(format!(
                "record {} is not a folder",
                metadata.id
            )));
        }
        let mut entries = BTreeMap::new();
        while !reader.is_empty() {
            let entry = FolderEntry::decode_from(&mut reader)?;
            if entries.contains_key(&entry.name) {
                return Err(StorageError::CorruptRecord(format!(
                    "folder {} has duplicate entry {:?}",
                    metadata.id, entry.name
                )));
            }
            entries.insert(entry.name.clone(), entry);
        }
        Ok(Self { metadata, entries })
    }
}
