//! Error types for lg.
//!
//! Only a few of these ever reach the user. Status, sizing and branch failures are
//! folded into "unavailable" by the listing pipeline; the rest abort the run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// No status report could be obtained (not a repository, git missing, non-zero exit).
    #[error("git status unavailable: {reason}")]
    StatusUnavailable { reason: String },

    #[error("malformed status record: {line:?}")]
    MalformedStatusRecord { line: String },

    #[error("status output exceeded {limit} bytes")]
    StatusOutputTooLarge { limit: usize },

    /// A path handed to the size utility would be read as a flag.
    #[error("refusing to pass '{}' to the size utility", path.display())]
    UnsafeSizePath { path: PathBuf },

    #[error("failed to run {program}: {source}")]
    CommandSpawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot access '{}': {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
