//! lg - ls with git status, size bars and scriptable output

pub mod collect;
pub mod config;
pub mod dirsize;
pub mod entry;
pub mod error;
pub mod git;
pub mod listing;
pub mod output;
pub mod process;
pub mod sort;
pub mod terminal;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use collect::{Collection, EntryCollector, SkippedEntry};
pub use config::{DetailLevel, DisplayConfig, OutputFormat};
pub use dirsize::DirectorySizer;
pub use entry::{FileEntry, FileKind};
pub use error::{Error, Result};
pub use git::{Change, StatusIndex, VcsStatus};
pub use listing::{Listing, build_listing};
pub use output::{format_size, render};
pub use process::{CapturedOutput, CommandRunner, SystemRunner};
pub use sort::sort_entries;
pub use terminal::terminal_width;
