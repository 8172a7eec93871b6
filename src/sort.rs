//! Ordering of collected entries.

use std::cmp::Ordering;

use crate::config::DisplayConfig;
use crate::entry::FileEntry;

/// Sort `entries` in place according to `config`, then reverse if requested.
///
/// With `unsorted` set the collection order is kept as is, reverse included.
pub fn sort_entries(entries: &mut [FileEntry], config: &DisplayConfig) {
    if config.unsorted {
        return;
    }
    entries.sort_by(|a, b| compare_entries(a, b, config));
    if config.reverse {
        entries.reverse();
    }
}

/// The comparator behind [`sort_entries`], without the final reversal.
pub fn compare_entries(a: &FileEntry, b: &FileEntry, config: &DisplayConfig) -> Ordering {
    if config.group_by_type {
        // Directories first
        let ord = b.is_dir().cmp(&a.is_dir());
        if ord != Ordering::Equal {
            return ord;
        }
        if !a.is_dir() {
            let ord = a
                .extension()
                .unwrap_or_default()
                .cmp(b.extension().unwrap_or_default());
            if ord != Ordering::Equal {
                return ord;
            }
        }
    }

    if config.sort_by_extension {
        let (ext_a, ext_b) = (a.extension(), b.extension());
        return ext_a
            .is_some()
            .cmp(&ext_b.is_some())
            .then_with(|| ext_a.cmp(&ext_b))
            .then_with(|| compare_names(a.name_bytes(), b.name_bytes()));
    }

    let primary = if config.sort_by_size {
        b.size.cmp(&a.size)
    } else if config.sort_by_time || !config.sort_alphabetical {
        a.modified_ns.cmp(&b.modified_ns)
    } else {
        Ordering::Equal
    };

    primary.then_with(|| compare_names(a.name_bytes(), b.name_bytes()))
}

/// Byte-wise comparison with ASCII case folding. Non-ASCII bytes compare raw.
pub fn compare_names(a: &[u8], b: &[u8]) -> Ordering {
    a.iter()
        .map(u8::to_ascii_lowercase)
        .cmp(b.iter().map(u8::to_ascii_lowercase))
}
