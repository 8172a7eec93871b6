//! JSON output formatting

use std::borrow::Cow;
use std::io::{self, Write};

use serde::Serialize;

use crate::entry::FileEntry;

use super::format::octal_mode;

/// One listing record. Field order is part of the output format.
#[derive(Debug, Serialize)]
pub struct JsonEntry<'a> {
    pub name: Cow<'a, str>,
    pub size: u64,
    pub mode: String,
    pub git: char,
}

impl<'a> From<&'a FileEntry> for JsonEntry<'a> {
    fn from(entry: &'a FileEntry) -> Self {
        Self {
            name: entry.display_name(),
            size: entry.size,
            mode: octal_mode(entry),
            git: entry.status.code(),
        }
    }
}

/// Write entries as a JSON array with one record per line.
pub fn write_json<W: Write>(out: &mut W, entries: &[FileEntry]) -> io::Result<()> {
    write!(out, "[")?;
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            write!(out, ",")?;
        }
        let record = serde_json::to_string(&JsonEntry::from(entry)).map_err(io::Error::other)?;
        write!(out, "\n  {}", record)?;
    }
    writeln!(out, "\n]")
}
