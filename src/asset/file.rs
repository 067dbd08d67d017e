//! File records and open file handles
//!
//! A file record is its metadata block followed by a 16-byte content
//! identifier. Content lives at `path_for(content_id)` in the content store,
//! so metadata and content can be relocated independently.

use super::AssetInfo;
use crate::addressing::path_for;
use crate::codec::{self, RecordReader};
use crate::content::{ContentInfo, ContentStream};
use crate::error::{FsError, StorageError};
use crate::metadata::{Metadata, MODE_PERM};
use crate::store::Storable;
use crate::types::Id;
use chrono::{DateTime, Utc};
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};

/// File: metadata plus the identifier of its content stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub metadata: Metadata,
    pub content_id: Id,
}

impl File {
    pub fn new(name: impl Into<String>, perm: u32) -> Self {
        Self {
            metadata: Metadata::new(name, perm & MODE_PERM),
            content_id: Id::new(),
        }
    }

    pub fn id(&self) -> Id {
        self.metadata.id
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Backend path of the content; never exposed through file info.
    pub fn content_path(&self) -> String {
        path_for(&self.content_id)
    }

    /// Combine content attributes with the file's own name and mode.
    pub fn info(&self, content: &ContentInfo) -> AssetInfo {
        let modified = content
            .modified
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|| self.metadata.modified());
        AssetInfo {
            id: self.metadata.id,
            owner: self.metadata.owner,
            name: self.metadata.name.clone(),
            mode: self.metadata.mode,
            size: content.size,
            modified,
            is_dir: false,
        }
    }
}

impl Storable for File {
    fn id(&self) -> Id {
        self.metadata.id
    }

    fn encode(&self) -> Result<Vec<u8>, StorageError> {
        let mut buf = Vec::new();
        self.metadata.encode_into(&mut buf)?;
        codec::put_id(&mut buf, &self.content_id);
        Ok(buf)
    }

    fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        let mut reader = RecordReader::new(bytes);
        let metadata = Metadata::decode_from(&mut reader)?;
        if metadata.is_dir() {
            return Err(StorageError::CorruptRecord(format!(
                "record {} is not a file",
                metadata.id
            )));
        }
        let content_id = reader.id("file content id")?;
        reader.finish("file record")?;
        Ok(Self {
            metadata,
            content_id,
        })
    }
}

/// An open file: its record plus a content stream.
pub struct FileHandle {
    file: File,
    stream: Box<dyn ContentStream>,
}

impl FileHandle {
    pub(crate) fn new(file: File, stream: Box<dyn ContentStream>) -> Self {
        Self { file, stream }
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn stat(&self) -> Result<AssetInfo, FsError> {
        let content = self
            .stream
            .info()
            .map_err(|e| FsError::io("stat", self.file.name(), e))?;
        Ok(self.file.info(&content))
    }

    /// Flush and sync the content stream.
    pub fn close(mut self) -> Result<(), FsError> {
        let name = self.file.metadata.name.clone();
        self.stream
            .flush()
            .and_then(|_| self.stream.sync())
            .map_err(|e| FsError::io("close", name, e))
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

impl Read for FileHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for FileHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl Seek for FileHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.stream.seek(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MODE_DIR;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_new_file_uses_two_identifiers() {
        let file = File::new("notes.txt", 0o644);
        assert_ne!(file.id(), file.content_id);
        assert!(!file.metadata.is_dir());
        assert_eq!(file.content_path(), path_for(&file.content_id));
    }

    #[test]
    fn test_round_trip() {
        let file = File::new("notes.txt", 0o600);
        let bytes = file.encode().unwrap();
        assert_eq!(&bytes[bytes.len() - 16..], file.content_id.as_bytes());
        assert_eq!(File::decode(&bytes).unwrap(), file);
    }

    #[test]
    fn test_missing_content_id_is_corrupt() {
        let file = File::new("notes.txt", 0o600);
        let bytes = file.encode().unwrap();
        assert!(matches!(
            File::decode(&bytes[..bytes.len() - 4]),
            Err(StorageError::CorruptRecord(_))
        ));
    }

    #[test]
    fn test_folder_record_is_not_a_file() {
        let mut meta = Metadata::new("d", MODE_DIR | 0o700);
        meta.owner = Id::new();
        let mut bytes = meta.encode().unwrap();
        bytes.extend_from_slice(Id::new().as_bytes());
        assert!(File::decode(&bytes).is_err());
    }

    #[test]
    fn test_info_prefers_logical_name_and_mode() {
        let file = File::new("report.pdf", 0o640);
        let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        let info = file.info(&ContentInfo {
            size: 42,
            modified: Some(when),
        });
        assert_eq!(info.name, "report.pdf");
        assert_eq!(info.mode, 0o640);
        assert_eq!(info.size, 42);
        assert_eq!(info.modified.timestamp(), 1_600_000_000);
        assert!(!info.is_dir);
    }
}
