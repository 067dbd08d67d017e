//! Core types for the identifier-addressed file store.

use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Id: opaque 128-bit identifier for records, owners, and content.
///
/// Generated as a random version-4 UUID; never reused once assigned.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(Uuid);

/// Size of the binary form of an [`Id`].
pub const ID_LEN: usize = 16;

impl Id {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Id(Uuid::new_v4())
    }

    /// The all-zero identifier, used as the owner of unowned assets.
    pub const fn nil() -> Self {
        Id(Uuid::nil())
    }

    /// Parse the canonical hyphenated form (or any form `uuid` accepts).
    pub fn parse(s: &str) -> Result<Self, StorageError> {
        Uuid::parse_str(s.trim())
            .map(Id)
            .map_err(|_| StorageError::InvalidIdentifier(s.to_string()))
    }

    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Id(Uuid::from_bytes(bytes))
    }

    /// Build an identifier from a raw slice; anything other than 16 bytes is rejected.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, StorageError> {
        Uuid::from_slice(bytes)
            .map(Id)
            .map_err(|_| StorageError::InvalidIdentifier(hex::encode(bytes)))
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        self.0.as_bytes()
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for Id {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.0.hyphenated())
    }
}

impl FromStr for Id {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Id::parse(s)
    }
}
