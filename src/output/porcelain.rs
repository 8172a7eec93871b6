//! Porcelain output: `<mode> <size> <status> <name>` per line.
//!
//! Scripts depend on this layout. Changing fields means a new format version.

use std::io::{self, Write};

use crate::entry::FileEntry;

use super::format::octal_mode;

pub fn write_porcelain<W: Write>(out: &mut W, entries: &[FileEntry]) -> io::Result<()> {
    for entry in entries {
        write!(
            out,
            "{} {} {} ",
            octal_mode(entry),
            entry.size,
            entry.status.code()
        )?;
        out.write_all(entry.name_bytes())?;
        writeln!(out)?;
    }
    Ok(())
}
