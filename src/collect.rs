//! Collects the entries of one directory.

use std::fs;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

use crate::config::DisplayConfig;
use crate::entry::FileEntry;
use crate::error::{Error, Result};
use crate::git::StatusIndex;

/// An entry that could not be stat'ed and was left out.
#[derive(Debug)]
pub struct SkippedEntry {
    pub path: PathBuf,
    pub error: io::Error,
}

/// Result of collecting one directory. Entry order is the directory's iteration order.
#[derive(Debug, Default)]
pub struct Collection {
    pub entries: Vec<FileEntry>,
    pub skipped: Vec<SkippedEntry>,
}

pub struct EntryCollector<'a> {
    config: &'a DisplayConfig,
    status: Option<&'a StatusIndex>,
}

impl<'a> EntryCollector<'a> {
    pub fn new(config: &'a DisplayConfig) -> Self {
        Self {
            config,
            status: None,
        }
    }

    /// Attach status information. Without it every entry stays clean.
    pub fn with_status(mut self, status: &'a StatusIndex) -> Self {
        self.status = Some(status);
        self
    }

    /// Read the direct children of `dir`.
    ///
    /// Failing to open `dir` is an error. Children that vanish or cannot be stat'ed
    /// are reported in [`Collection::skipped`] and collection continues.
    pub fn collect(&self, dir: &Path) -> Result<Collection> {
        let read_dir_error = |source| Error::ReadDir {
            path: dir.to_path_buf(),
            source,
        };
        let read_dir = fs::read_dir(dir).map_err(read_dir_error)?;

        let mut collection = Collection::default();

        if self.config.dir_sizes {
            let meta = fs::symlink_metadata(dir).map_err(read_dir_error)?;
            // The directory's own status is never looked up.
            if let Some(entry) = FileEntry::from_metadata(".".into(), &meta) {
                collection.entries.push(entry);
            }
        }

        for dir_entry in read_dir {
            let dir_entry = match dir_entry {
                Ok(e) => e,
                Err(error) => {
                    collection.skipped.push(SkippedEntry {
                        path: dir.to_path_buf(),
                        error,
                    });
                    continue;
                }
            };

            let name = dir_entry.file_name();
            if !self.config.show_hidden && name.as_bytes().first() == Some(&b'.') {
                continue;
            }
            if let Some(filters) = &self.config.names {
                if !filters.iter().any(|f| names_match(name.as_bytes(), f)) {
                    continue;
                }
            }

            let path = dir_entry.path();
            let meta = match fs::symlink_metadata(&path) {
                Ok(m) => m,
                Err(error) => {
                    log::debug!("stat failed for {}: {}", path.display(), error);
                    collection.skipped.push(SkippedEntry { path, error });
                    continue;
                }
            };

            let Some(mut entry) = FileEntry::from_metadata(name, &meta) else {
                log::debug!("skipping unsupported file type: {}", path.display());
                continue;
            };

            if let Some(index) = self.status {
                entry.status = index.effective_status(&entry.display_name(), entry.is_dir());
            }
            collection.entries.push(entry);
        }

        Ok(collection)
    }
}

/// Case-sensitive name comparison that tolerates decomposed Unicode on disk.
///
/// Raw bytes are compared first; only if they differ are both sides normalized to NFC.
pub fn names_match(name: &[u8], filter: &str) -> bool {
    if name == filter.as_bytes() {
        return true;
    }
    match std::str::from_utf8(name) {
        Ok(name) => name.nfc().eq(filter.nfc()),
        Err(_) => false,
    }
}
