//! Display configuration shared by every stage of a listing.

use std::path::PathBuf;

/// How many metadata columns the human-readable listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailLevel {
    /// Size, optional inode, status, time and name
    #[default]
    Minimal,
    /// Adds the permission string
    Standard,
    /// Adds octal mode and numeric owner/group
    Full,
}

impl DetailLevel {
    /// Map a repeated `-l` count onto a level.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 => DetailLevel::Minimal,
            1 => DetailLevel::Standard,
            _ => DetailLevel::Full,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Porcelain,
}

/// Configuration for one run. Built once from the command line, then read-only.
#[derive(Debug, Clone, Default)]
pub struct DisplayConfig {
    pub path: PathBuf,
    pub detail: DetailLevel,
    pub format: OutputFormat,
    pub show_hidden: bool,
    /// Compute recursive directory sizes with the external size utility
    pub dir_sizes: bool,
    pub group_by_type: bool,
    pub show_inodes: bool,
    pub reverse: bool,
    pub sort_by_size: bool,
    pub sort_by_time: bool,
    pub sort_alphabetical: bool,
    pub sort_by_extension: bool,
    pub unsorted: bool,
    pub one_column: bool,
    /// Append `/`, `*` and `@` to directories, executables and symlinks
    pub type_indicators: bool,
    pub append_slash: bool,
    pub omit_owner: bool,
    pub omit_group: bool,
    /// Only list entries with one of these names
    pub names: Option<Vec<String>>,
    pub show_branch: bool,
    pub show_legend: bool,
    pub use_color: bool,
}

impl DisplayConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}
