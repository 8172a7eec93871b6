//! Column value formatting shared by the renderers

use chrono::DateTime;

use crate::entry::{FileEntry, FileKind};

/// Format a size in bytes to human-readable format.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1}G", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}M", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}K", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Format a nanosecond timestamp as `Mon dd HH:MM` in UTC, day padded with a space.
pub fn format_time(nanos: i128) -> String {
    let secs = nanos.div_euclid(1_000_000_000);
    let subsec = nanos.rem_euclid(1_000_000_000) as u32;
    i64::try_from(secs)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, subsec))
        .map(|t| t.format("%b %e %H:%M").to_string())
        .unwrap_or_else(|| "??? ?? ??:??".to_string())
}

/// `ls`-style permission string, e.g. `drwxr-xr-x`.
pub fn permission_string(entry: &FileEntry) -> String {
    let type_char = match entry.kind {
        FileKind::Directory => 'd',
        FileKind::Symlink => 'l',
        FileKind::RegularFile { .. } => '-',
    };
    let mut out = String::with_capacity(10);
    out.push(type_char);
    for shift in [6, 3, 0] {
        let bits = (entry.mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

/// Four-digit octal permission bits, e.g. `0644`.
pub fn octal_mode(entry: &FileEntry) -> String {
    format!("{:04o}", entry.permission_bits())
}
