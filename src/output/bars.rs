//! Logarithmic size bars.
//!
//! Files and directories are scaled separately. Within a category the smallest
//! non-zero size gets width [`MIN_BAR_WIDTH`] and the largest [`MAX_BAR_WIDTH`].

use crate::entry::FileEntry;

pub const MIN_BAR_WIDTH: usize = 1;
pub const MAX_BAR_WIDTH: usize = 9;

#[derive(Debug, Clone, Copy)]
struct LogRange {
    min: f64,
    max: f64,
    count: usize,
}

impl LogRange {
    fn of<'a>(sizes: impl Iterator<Item = &'a FileEntry>) -> Option<Self> {
        let mut range: Option<LogRange> = None;
        for size in sizes.map(|e| e.size).filter(|&s| s > 0) {
            let log = (size as f64).ln();
            range = Some(match range {
                None => LogRange {
                    min: log,
                    max: log,
                    count: 1,
                },
                Some(r) => LogRange {
                    min: r.min.min(log),
                    max: r.max.max(log),
                    count: r.count + 1,
                },
            });
        }
        range
    }

    fn width(&self, size: u64) -> Option<usize> {
        // A bar needs a non-zero sibling to be compared against.
        if size == 0 || self.count < 2 {
            return None;
        }
        if self.max == self.min {
            return Some(MAX_BAR_WIDTH);
        }
        let fraction = ((size as f64).ln() - self.min) / (self.max - self.min);
        let span = (MAX_BAR_WIDTH - MIN_BAR_WIDTH) as f64;
        let width = MIN_BAR_WIDTH + (fraction * span).round() as usize;
        Some(width.clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH))
    }
}

/// Bar width for every entry, in order. `None` where no bar is drawn.
pub fn size_bar_widths(entries: &[FileEntry]) -> Vec<Option<usize>> {
    let files = LogRange::of(entries.iter().filter(|e| !e.is_dir()));
    let dirs = LogRange::of(entries.iter().filter(|e| e.is_dir()));

    entries
        .iter()
        .map(|entry| {
            let range = if entry.is_dir() { dirs } else { files };
            range.and_then(|r| r.width(entry.size))
        })
        .collect()
}
