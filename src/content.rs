//! Content Storage
//!
//! Raw byte streams for file content, located by the content-addressing path
//! of an identifier and independent of the record store. Concurrent writers
//! to the same path race exactly as plain files do.

use crate::addressing::path_for;
use crate::types::Id;
use std::io::{self, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Open flags, mirroring `std::fs::OpenOptions`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub create: bool,
    /// Fail if the target already exists.
    pub create_new: bool,
    pub truncate: bool,
}

impl OpenFlags {
    pub fn read_only() -> Self {
        Self {
            read: true,
            ..Self::default()
        }
    }

    pub fn read_write() -> Self {
        Self {
            read: true,
            write: true,
            ..Self::default()
        }
    }

    /// Read-write, creating the file if it is missing.
    pub fn create() -> Self {
        Self {
            create: true,
            ..Self::read_write()
        }
    }

    /// Write-only, creating or truncating.
    pub fn overwrite() -> Self {
        Self {
            write: true,
            create: true,
            truncate: true,
            ..Self::default()
        }
    }

    pub fn with_append(mut self) -> Self {
        self.append = true;
        self
    }

    pub fn with_create_new(mut self) -> Self {
        self.create_new = true;
        self
    }

    /// True when any flag would modify or create the target.
    pub fn wants_write(&self) -> bool {
        self.write || self.append || self.create || self.create_new || self.truncate
    }

    pub fn wants_create(&self) -> bool {
        self.create || self.create_new
    }

    fn to_open_options(self) -> std::fs::OpenOptions {
        let writes = self.write || self.append || self.truncate;
        let mut options = std::fs::OpenOptions::new();
        options
            .read(self.read || !writes)
            .write(self.write || (self.truncate && !self.append))
            .append(self.append)
            .truncate(self.truncate && !self.append)
            .create(self.create && writes);
        options
    }
}

/// Size and time attributes of stored content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentInfo {
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl ContentInfo {
    fn from_fs(metadata: &std::fs::Metadata) -> Self {
        Self {
            size: metadata.len(),
            modified: metadata.modified().ok(),
        }
    }
}

/// An open content stream.
pub trait ContentStream: Read + Write + Seek + Send {
    fn info(&self) -> io::Result<ContentInfo>;
    fn sync(&mut self) -> io::Result<()>;
}

/// Byte-stream backend addressed by slash-separated paths.
pub trait ContentStore: Send + Sync {
    fn open(&self, path: &str, flags: OpenFlags) -> io::Result<Box<dyn ContentStream>>;
    /// Create an empty object at `path`, creating parent directories as needed.
    fn allocate(&self, path: &str) -> io::Result<()>;
    fn stat(&self, path: &str) -> io::Result<ContentInfo>;
    /// Removing an absent object is not an error.
    fn remove(&self, path: &str) -> io::Result<()>;

    fn open_id(&self, id: &Id, flags: OpenFlags) -> io::Result<Box<dyn ContentStream>> {
        self.open(&path_for(id), flags)
    }

    fn allocate_id(&self, id: &Id) -> io::Result<()> {
        self.allocate(&path_for(id))
    }

    fn stat_id(&self, id: &Id) -> io::Result<ContentInfo> {
        self.stat(&path_for(id))
    }

    fn remove_id(&self, id: &Id) -> io::Result<()> {
        self.remove(&path_for(id))
    }
}

/// Content store rooted at a local directory.
pub struct LocalContentStore {
    root: PathBuf,
}

impl LocalContentStore {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a store path onto the local root; `..` segments are refused.
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let mut resolved = self.root.clone();
        for segment in path.split('/').filter(|s| !s.is_empty() && *s != ".") {
            if segment == ".." {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("content path escapes root: {}", path),
                ));
            }
            resolved.push(segment);
        }
        Ok(resolved)
    }
}

struct LocalStream {
    file: std::fs::File,
}

impl Read for LocalStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for LocalStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for LocalStream {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl ContentStream for LocalStream {
    fn info(&self) -> io::Result<ContentInfo> {
        Ok(ContentInfo::from_fs(&self.file.metadata()?))
    }

    fn sync(&mut self) -> io::Result<()> {
        self.file.sync_all()
    }
}

impl ContentStore for LocalContentStore {
    fn open(&self, path: &str, flags: OpenFlags) -> io::Result<Box<dyn ContentStream>> {
        let local = self.resolve(path)?;
        if flags.create {
            if let Some(parent) = local.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = flags.to_open_options().open(&local)?;
        Ok(Box::new(LocalStream { file }))
    }

    fn allocate(&self, path: &str) -> io::Result<()> {
        let local = self.resolve(path)?;
        if let Some(parent) = local.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&local)?;
        Ok(())
    }

    fn stat(&self, path: &str) -> io::Result<ContentInfo> {
        let local = self.resolve(path)?;
        Ok(ContentInfo::from_fs(&std::fs::metadata(local)?))
    }

    fn remove(&self, path: &str) -> io::Result<()> {
        let local = self.resolve(path)?;
        match std::fs::remove_file(&local) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
