//! The listing pipeline: status → collect → size → sort.

use crate::collect::EntryCollector;
use crate::config::DisplayConfig;
use crate::dirsize::DirectorySizer;
use crate::entry::FileEntry;
use crate::error::Result;
use crate::git::{self, StatusIndex};
use crate::process::CommandRunner;

/// A sorted, annotated directory listing ready to render.
#[derive(Debug, Default)]
pub struct Listing {
    pub entries: Vec<FileEntry>,
    /// Whether git status could be read for the target directory.
    pub status_available: bool,
    pub branch: Option<String>,
    /// Non-fatal problems to show the user.
    pub warnings: Vec<String>,
}

/// Build the listing for `config.path`.
///
/// Only failing to read the target directory is an error. Missing git, a failed
/// status report, a failed size run or an unreadable child degrade the listing.
pub fn build_listing(config: &DisplayConfig, runner: &dyn CommandRunner) -> Result<Listing> {
    let dir = config.path.as_path();
    let mut warnings = Vec::new();

    let status: Option<StatusIndex> = match git::load_status(runner, dir) {
        Ok(index) => Some(index),
        Err(e) => {
            log::debug!("continuing without status: {}", e);
            None
        }
    };

    let branch = if config.show_branch && status.is_some() {
        git::current_branch(runner, dir).unwrap_or_else(|e| {
            warnings.push(e.to_string());
            None
        })
    } else {
        None
    };

    let mut collector = EntryCollector::new(config);
    if let Some(index) = &status {
        collector = collector.with_status(index);
    }
    let collection = collector.collect(dir)?;
    let mut entries = collection.entries;
    warnings.extend(
        collection
            .skipped
            .iter()
            .map(|s| format!("cannot access '{}': {}", s.path.display(), s.error)),
    );

    if config.dir_sizes {
        if let Err(e) = DirectorySizer::new(runner).apply(dir, &mut entries) {
            warnings.push(e.to_string());
        }
    }

    crate::sort::sort_entries(&mut entries, config);

    Ok(Listing {
        entries,
        status_available: status.is_some(),
        branch,
        warnings,
    })
}
