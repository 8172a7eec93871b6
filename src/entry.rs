//! Directory entries and their metadata

use std::ffi::OsString;
use std::fs::Metadata;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;

use crate::git::VcsStatus;

const OWNER_EXECUTE: u32 = 0o100;

/// What kind of filesystem object an entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    RegularFile { executable: bool },
    Directory,
    Symlink,
}

impl FileKind {
    /// Classify symlink-unfollowed metadata. Devices, sockets and pipes yield `None`.
    pub fn from_metadata(meta: &Metadata) -> Option<Self> {
        let file_type = meta.file_type();
        if file_type.is_symlink() {
            Some(FileKind::Symlink)
        } else if file_type.is_dir() {
            Some(FileKind::Directory)
        } else if file_type.is_file() {
            Some(FileKind::RegularFile {
                executable: meta.mode() & OWNER_EXECUTE != 0,
            })
        } else {
            None
        }
    }
}

/// One child of the listed directory, or the directory itself as `.`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: OsString,
    pub kind: FileKind,
    /// Bytes. For directories, 0 unless aggregate sizing filled it in.
    pub size: u64,
    /// Nanoseconds since the Unix epoch.
    pub modified_ns: i128,
    pub mode: u32,
    pub owner: u32,
    pub group: u32,
    pub inode: u64,
    pub status: VcsStatus,
}

impl FileEntry {
    /// Build an entry from `lstat` metadata. `None` for unsupported file kinds.
    pub fn from_metadata(name: OsString, meta: &Metadata) -> Option<Self> {
        let kind = FileKind::from_metadata(meta)?;
        let size = match kind {
            FileKind::Directory => 0,
            _ => meta.len(),
        };
        Some(Self {
            name,
            kind,
            size,
            modified_ns: meta.mtime() as i128 * 1_000_000_000 + meta.mtime_nsec() as i128,
            mode: meta.mode(),
            owner: meta.uid(),
            group: meta.gid(),
            inode: meta.ino(),
            status: VcsStatus::Clean,
        })
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }

    pub fn name_bytes(&self) -> &[u8] {
        self.name.as_bytes()
    }

    /// Extension after the last `.`, excluding a leading dot (`.bashrc` has none).
    pub fn extension(&self) -> Option<&[u8]> {
        extension_of(self.name_bytes())
    }

    /// Permission bits without the file type.
    pub fn permission_bits(&self) -> u32 {
        self.mode & 0o7777
    }

    /// Lossy name for display.
    pub fn display_name(&self) -> std::borrow::Cow<'_, str> {
        self.name.to_string_lossy()
    }
}

pub(crate) fn extension_of(name: &[u8]) -> Option<&[u8]> {
    match name.iter().rposition(|&b| b == b'.') {
        Some(0) | None => None,
        Some(pos) => Some(&name[pos + 1..]),
    }
}

/// Convenience for building entries in tests and benches.
#[cfg(any(test, feature = "test-utils"))]
impl FileEntry {
    pub fn new(name: impl AsRef<std::ffi::OsStr>, kind: FileKind) -> Self {
        let mode = match kind {
            FileKind::Directory => 0o040755,
            FileKind::Symlink => 0o120777,
            FileKind::RegularFile { executable: true } => 0o100755,
            FileKind::RegularFile { executable: false } => 0o100644,
        };
        Self {
            name: name.as_ref().to_os_string(),
            kind,
            size: 0,
            modified_ns: 0,
            mode,
            owner: 0,
            group: 0,
            inode: 0,
            status: VcsStatus::Clean,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_mtime_secs(mut self, secs: i64) -> Self {
        self.modified_ns = secs as i128 * 1_000_000_000;
        self
    }

    pub fn with_status(mut self, status: VcsStatus) -> Self {
        self.status = status;
        self
    }
}
