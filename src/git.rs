//! Git status integration
//!
//! The whole repository's status is read once from `git status --porcelain=v2` and
//! parsed into a [`StatusIndex`]. Per-entry lookups never touch git again.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};
use crate::process::CommandRunner;

/// Cap on the status report. Truncated status data is never trusted.
pub const STATUS_OUTPUT_LIMIT: usize = 1024 * 1024;

const BRANCH_OUTPUT_LIMIT: usize = 4096;
const PREFIX_OUTPUT_LIMIT: usize = 64 * 1024;

/// The kind of change a status records, independent of staged/unstaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    Modified,
    Added,
    Deleted,
    Renamed,
    Copied,
}

impl Change {
    /// Map a porcelain status letter. `None` for "no change" (`.` or space).
    ///
    /// Letters outside M/A/D/R/C (type changes, unmerged) count as modifications.
    fn from_letter(letter: char) -> Option<Self> {
        match letter {
            '.' | ' ' => None,
            'M' => Some(Change::Modified),
            'A' => Some(Change::Added),
            'D' => Some(Change::Deleted),
            'R' => Some(Change::Renamed),
            'C' => Some(Change::Copied),
            _ => Some(Change::Modified),
        }
    }

    fn letter(self) -> char {
        match self {
            Change::Modified => 'M',
            Change::Added => 'A',
            Change::Deleted => 'D',
            Change::Renamed => 'R',
            Change::Copied => 'C',
        }
    }
}

/// Version-control status of one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VcsStatus {
    /// Change present in the working tree but not yet staged
    Unstaged(Change),
    /// Change recorded in the index
    Staged(Change),
    Untracked,
    Ignored,
    #[default]
    Clean,
}

impl VcsStatus {
    /// Resolve a porcelain `XY` pair. The unstaged side wins whenever it records a change.
    pub fn from_xy(staged: char, unstaged: char) -> Self {
        if let Some(change) = Change::from_letter(unstaged) {
            VcsStatus::Unstaged(change)
        } else if let Some(change) = Change::from_letter(staged) {
            VcsStatus::Staged(change)
        } else {
            VcsStatus::Clean
        }
    }

    /// Priority used for subtree inheritance: unstaged 3, staged 2, untracked 1, else 0.
    pub fn priority(self) -> u8 {
        match self {
            VcsStatus::Unstaged(_) => 3,
            VcsStatus::Staged(_) => 2,
            VcsStatus::Untracked => 1,
            VcsStatus::Ignored | VcsStatus::Clean => 0,
        }
    }

    /// Single-character code for scripting output.
    ///
    /// Staged changes are uppercase letters, unstaged lowercase, then `?`, `!` and space.
    pub fn code(self) -> char {
        match self {
            VcsStatus::Staged(change) => change.letter(),
            VcsStatus::Unstaged(change) => change.letter().to_ascii_lowercase(),
            VcsStatus::Untracked => '?',
            VcsStatus::Ignored => '!',
            VcsStatus::Clean => ' ',
        }
    }

    /// Symbol shown in the human-readable status column.
    pub fn symbol(self) -> char {
        match self {
            VcsStatus::Staged(_) => '●',
            VcsStatus::Unstaged(_) => '○',
            VcsStatus::Untracked => '?',
            VcsStatus::Ignored => '!',
            VcsStatus::Clean => ' ',
        }
    }
}

impl fmt::Display for VcsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Path → status lookup built from one status report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusIndex {
    statuses: HashMap<String, VcsStatus>,
}

impl StatusIndex {
    /// Parse a `git status --porcelain=v2` report.
    ///
    /// `1`/`2` lines are tracked records, `?` untracked, `!` ignored; everything else
    /// is header metadata. A tracked record without a status code and path fails the
    /// whole parse.
    pub fn parse(report: &str) -> Result<Self> {
        let mut statuses = HashMap::new();

        for line in report.lines() {
            match line.as_bytes().first() {
                Some(b'1') => {
                    let (path, status) = parse_tracked(line, 9)?;
                    statuses.insert(path, status);
                }
                Some(b'2') => {
                    let (path, status) = parse_tracked(line, 10)?;
                    statuses.insert(path, status);
                }
                Some(b'?') => {
                    let path = line[1..].trim();
                    if !path.is_empty() {
                        statuses.insert(unquote_path(path), VcsStatus::Untracked);
                    }
                }
                Some(b'!') => {
                    let path = line[1..].trim();
                    if !path.is_empty() {
                        statuses.insert(unquote_path(path), VcsStatus::Ignored);
                    }
                }
                _ => {}
            }
        }

        Ok(Self { statuses })
    }

    /// Build an index from explicit entries.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, VcsStatus)>,
        S: Into<String>,
    {
        Self {
            statuses: entries
                .into_iter()
                .map(|(path, status)| (path.into(), status))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<VcsStatus> {
        self.statuses.get(path).copied()
    }

    /// Effective status of `path`, inheriting from the subtree for directories.
    ///
    /// Files without a record are clean unless the whole directory (`./`) is untracked.
    /// Directories without a record take the highest-priority status found below them.
    pub fn effective_status(&self, path: &str, is_dir: bool) -> VcsStatus {
        if let Some(status) = self.get(path) {
            return status;
        }

        if is_dir {
            let dir_key = format!("{}/", path);
            if let Some(status) = self.get(&dir_key) {
                return status;
            }
            return self
                .statuses
                .iter()
                .filter(|(key, _)| key.starts_with(&dir_key))
                .map(|(_, status)| *status)
                .max_by_key(|status| status.priority())
                .unwrap_or(VcsStatus::Clean);
        }

        if self.get("./") == Some(VcsStatus::Untracked) {
            return VcsStatus::Untracked;
        }
        VcsStatus::Clean
    }

    /// Re-key the index relative to a directory inside the repository.
    ///
    /// `prefix` is the directory's repository-relative path with a trailing `/`
    /// (empty for the repository root), as printed by `git rev-parse --show-prefix`.
    /// Records outside the directory are dropped. If the directory itself or one of
    /// its ancestors is reported untracked, the result carries `./` as untracked.
    pub fn relative_to(&self, prefix: &str) -> StatusIndex {
        if prefix.is_empty() {
            return self.clone();
        }

        let mut statuses = HashMap::new();
        for (key, status) in &self.statuses {
            if key == prefix {
                statuses.insert("./".to_string(), *status);
            } else if let Some(rest) = key.strip_prefix(prefix) {
                statuses.insert(rest.to_string(), *status);
            } else if *status == VcsStatus::Untracked
                && key.ends_with('/')
                && prefix.starts_with(key.as_str())
            {
                statuses.insert("./".to_string(), VcsStatus::Untracked);
            }
        }
        StatusIndex { statuses }
    }
}

/// Split a tracked record into path and status.
///
/// The path is always the last of `fields` space-separated fields, so it may contain
/// spaces. Rename/copy records append `<TAB>origPath`, which is dropped.
fn parse_tracked(line: &str, fields: usize) -> Result<(String, VcsStatus)> {
    let malformed = || Error::MalformedStatusRecord {
        line: line.to_string(),
    };

    let parts: Vec<&str> = line.splitn(fields, ' ').collect();
    if parts.len() < 3 {
        return Err(malformed());
    }

    let mut xy = parts[1].chars();
    let (staged, unstaged) = match (xy.next(), xy.next(), xy.next()) {
        (Some(x), Some(y), None) => (x, y),
        _ => return Err(malformed()),
    };

    let last = parts[parts.len() - 1];
    let path = last.split('\t').next().unwrap_or(last);
    if path.is_empty() {
        return Err(malformed());
    }

    Ok((unquote_path(path), VcsStatus::from_xy(staged, unstaged)))
}

/// Undo git's C-style quoting of unusual path names.
///
/// Paths that need it are wrapped in double quotes, with control characters
/// backslash-escaped and non-ASCII bytes written as three-digit octal escapes.
/// Unquoted paths are returned as-is.
fn unquote_path(path: &str) -> String {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return path.to_string();
    };

    let bytes = inner.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            decoded.push(bytes[i]);
            i += 1;
            continue;
        }
        let escaped = bytes[i + 1];
        let octal = bytes
            .get(i + 1..i + 4)
            .filter(|digits| digits.iter().all(|b| (b'0'..=b'7').contains(b)));
        if let Some(digits) = octal {
            let value = digits
                .iter()
                .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
            decoded.push(value as u8);
            i += 4;
            continue;
        }
        decoded.push(match escaped {
            b'a' => 0x07,
            b'b' => 0x08,
            b't' => b'\t',
            b'n' => b'\n',
            b'v' => 0x0b,
            b'f' => 0x0c,
            b'r' => b'\r',
            other => other,
        });
        i += 2;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

/// Fetch and parse the status of the repository containing `dir`, keyed relative to `dir`.
///
/// Not being in a repository, git being missing and oversized output all fail with
/// an error; callers treat any error as "status unavailable".
pub fn load_status(runner: &dyn CommandRunner, dir: &Path) -> Result<StatusIndex> {
    let prefix = run_git(runner, dir, &["rev-parse", "--show-prefix"], PREFIX_OUTPUT_LIMIT)?;
    let prefix = String::from_utf8_lossy(&prefix).trim().to_string();

    let report = run_git(
        runner,
        dir,
        &["status", "--porcelain=v2"],
        STATUS_OUTPUT_LIMIT,
    )?;
    let report = String::from_utf8_lossy(&report);

    let index = StatusIndex::parse(&report)?;
    log::debug!(
        "parsed {} status records, target prefix {:?}",
        index.len(),
        prefix
    );
    Ok(index.relative_to(&prefix))
}

fn run_git(
    runner: &dyn CommandRunner,
    dir: &Path,
    args: &[&str],
    limit: usize,
) -> Result<Vec<u8>> {
    let args: Vec<OsString> = args.iter().map(OsString::from).collect();
    let output = runner
        .run("git", &args, dir, limit)
        .map_err(|e| Error::StatusUnavailable {
            reason: e.to_string(),
        })?;

    if output.truncated {
        return Err(Error::StatusOutputTooLarge { limit });
    }
    if !output.success {
        return Err(Error::StatusUnavailable {
            reason: "git exited with an error".to_string(),
        });
    }
    Ok(output.stdout)
}

/// Current branch name of the repository containing `dir`.
///
/// Returns `None` outside a repository, on a detached HEAD, or when git is missing.
/// Only unexpected I/O failures are reported.
pub fn current_branch(runner: &dyn CommandRunner, dir: &Path) -> Result<Option<String>> {
    let args = [OsString::from("branch"), OsString::from("--show-current")];
    let output = match runner.run("git", &args, dir, BRANCH_OUTPUT_LIMIT) {
        Ok(output) => output,
        Err(e) if matches!(e.kind(), io::ErrorKind::NotFound | io::ErrorKind::BrokenPipe) => {
            log::debug!("branch lookup skipped: {}", e);
            return Ok(None);
        }
        Err(e) => {
            return Err(Error::CommandSpawn {
                program: "git".to_string(),
                source: e,
            });
        }
    };

    if !output.success {
        return Ok(None);
    }
    let branch = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(if branch.is_empty() { None } else { Some(branch) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::CapturedOutput;
    use crate::process::fake::FakeRunner;
    use crate::test_utils::TestRepo;

    const ALL_LETTERS: [char; 5] = ['M', 'A', 'D', 'R', 'C'];

    #[test]
    fn test_parse_staged_modified_record() {
        let index =
            StatusIndex::parse("1 M. N... 100644 100644 100644 h1 h2 path/to/file\n").unwrap();
        assert_eq!(
            index.effective_status("path/to/file", false),
            VcsStatus::Staged(Change::Modified)
        );
    }

    #[test]
    fn test_parse_quoted_paths() {
        let report = "? \"caf\\303\\251.txt\"\n1 .M N... 100644 100644 100644 h1 h2 \"tab\\there\"\n";
        let index = StatusIndex::parse(report).unwrap();
        assert_eq!(index.get("café.txt"), Some(VcsStatus::Untracked));
        assert_eq!(
            index.get("tab\there"),
            Some(VcsStatus::Unstaged(Change::Modified))
        );
    }

    #[test]
    fn test_unquote_leaves_plain_paths_alone() {
        assert_eq!(unquote_path("with space.txt"), "with space.txt");
        assert_eq!(unquote_path("\"a\\\"b\\\\c\""), "a\"b\\c");
    }

    #[test]
    fn test_unstaged_dominates_staged() {
        for staged in ['.', ' ', 'M', 'A', 'D', 'R', 'C'] {
            for unstaged in ALL_LETTERS {
                let status = VcsStatus::from_xy(staged, unstaged);
                assert!(
                    matches!(status, VcsStatus::Unstaged(_)),
                    "{}{} resolved to {:?}",
                    staged,
                    unstaged,
                    status
                );
                assert_eq!(status.code(), unstaged.to_ascii_lowercase());
            }
        }
    }

    #[test]
    fn test_no_change_pair_is_clean() {
        for staged in ['.', ' '] {
            for unstaged in ['.', ' '] {
                assert_eq!(VcsStatus::from_xy(staged, unstaged), VcsStatus::Clean);
            }
        }
    }

    #[test]
    fn test_path_with_spaces_is_kept_whole() {
        let index =
            StatusIndex::parse("1 .M N... 100644 100644 100644 h1 h2 my file name.txt").unwrap();
        assert_eq!(
            index.get("my file name.txt"),
            Some(VcsStatus::Unstaged(Change::Modified))
        );
    }

    #[test]
    fn test_rename_record_uses_new_path() {
        let report = "2 R. N... 100644 100644 100644 h1 h2 R100 new name.rs\told.rs\n";
        let index = StatusIndex::parse(report).unwrap();
        assert_eq!(
            index.get("new name.rs"),
            Some(VcsStatus::Staged(Change::Renamed))
        );
        assert_eq!(index.get("old.rs"), None);
    }

    #[test]
    fn test_untracked_and_ignored_records() {
        let index = StatusIndex::parse("? notes.txt \n? build/\n! target/\n").unwrap();
        assert_eq!(index.get("notes.txt"), Some(VcsStatus::Untracked));
        assert_eq!(index.get("build/"), Some(VcsStatus::Untracked));
        assert_eq!(index.get("target/"), Some(VcsStatus::Ignored));
    }

    #[test]
    fn test_header_lines_are_ignored() {
        let report = "# branch.oid abc\n# branch.head main\nu UU N... 1 2 3 4 h1 h2 h3 x\n";
        let index = StatusIndex::parse(report).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_malformed_tracked_record_fails() {
        assert!(matches!(
            StatusIndex::parse("1 M.\n"),
            Err(Error::MalformedStatusRecord { .. })
        ));
        assert!(StatusIndex::parse("1\n").is_err());
        assert!(StatusIndex::parse("1 MMM x\n").is_err());
    }

    #[test]
    fn test_last_duplicate_wins() {
        let report = "? a.txt\n1 .M N... 100644 100644 100644 h1 h2 a.txt\n";
        let index = StatusIndex::parse(report).unwrap();
        assert_eq!(
            index.get("a.txt"),
            Some(VcsStatus::Unstaged(Change::Modified))
        );
    }

    #[test]
    fn test_directory_key_without_trailing_slash() {
        let index = StatusIndex::from_entries([("src/", VcsStatus::Untracked)]);
        assert_eq!(index.effective_status("src", true), VcsStatus::Untracked);
    }

    #[test]
    fn test_directory_inherits_highest_priority() {
        let index = StatusIndex::from_entries([
            ("src/a.rs", VcsStatus::Untracked),
            ("src/b.rs", VcsStatus::Staged(Change::Added)),
            ("src/deep/c.rs", VcsStatus::Unstaged(Change::Deleted)),
            ("srcx/d.rs", VcsStatus::Unstaged(Change::Modified)),
        ]);
        assert_eq!(
            index.effective_status("src", true),
            VcsStatus::Unstaged(Change::Deleted)
        );
        assert_eq!(index.effective_status("other", true), VcsStatus::Clean);
    }

    #[test]
    fn test_root_untracked_inheritance() {
        let index = StatusIndex::from_entries([("./", VcsStatus::Untracked)]);
        assert_eq!(
            index.effective_status("anything.txt", false),
            VcsStatus::Untracked
        );
    }

    #[test]
    fn test_file_without_record_is_clean() {
        let index = StatusIndex::from_entries([("a.txt", VcsStatus::Untracked)]);
        assert_eq!(index.effective_status("b.txt", false), VcsStatus::Clean);
    }

    #[test]
    fn test_relative_to_subdirectory() {
        let index = StatusIndex::from_entries([
            ("sub/a.txt", VcsStatus::Staged(Change::Added)),
            ("sub/inner/b.txt", VcsStatus::Untracked),
            ("top.txt", VcsStatus::Unstaged(Change::Modified)),
        ]);
        let rel = index.relative_to("sub/");
        assert_eq!(rel.get("a.txt"), Some(VcsStatus::Staged(Change::Added)));
        assert_eq!(rel.effective_status("inner", true), VcsStatus::Untracked);
        assert_eq!(rel.get("top.txt"), None);
    }

    #[test]
    fn test_relative_to_untracked_ancestor() {
        let index = StatusIndex::from_entries([("new/", VcsStatus::Untracked)]);
        let rel = index.relative_to("new/deeper/");
        assert_eq!(rel.effective_status("file.rs", false), VcsStatus::Untracked);
    }

    #[test]
    fn test_priorities() {
        assert_eq!(VcsStatus::Unstaged(Change::Copied).priority(), 3);
        assert_eq!(VcsStatus::Staged(Change::Copied).priority(), 2);
        assert_eq!(VcsStatus::Untracked.priority(), 1);
        assert_eq!(VcsStatus::Ignored.priority(), 0);
        assert_eq!(VcsStatus::Clean.priority(), 0);
    }

    #[test]
    fn test_load_status_with_fake_runner() {
        let runner = FakeRunner::new()
            .respond("git rev-parse --show-prefix", CapturedOutput::ok("sub/\n"))
            .respond(
                "git status --porcelain=v2",
                CapturedOutput::ok("# branch.head main\n? sub/new.txt\n"),
            );
        let index = load_status(&runner, Path::new("/repo/sub")).unwrap();
        assert_eq!(index.get("new.txt"), Some(VcsStatus::Untracked));
    }

    #[test]
    fn test_load_status_outside_repository() {
        let runner = FakeRunner::new().respond(
            "git rev-parse --show-prefix",
            CapturedOutput::failed(),
        );
        assert!(matches!(
            load_status(&runner, Path::new("/tmp")),
            Err(Error::StatusUnavailable { .. })
        ));
    }

    #[test]
    fn test_load_status_oversized_report_fails() {
        let big = "? x\n".repeat(STATUS_OUTPUT_LIMIT / 4 + 1);
        let runner = FakeRunner::new()
            .respond("git rev-parse --show-prefix", CapturedOutput::ok("\n"))
            .respond("git status --porcelain=v2", CapturedOutput::ok(big));
        assert!(matches!(
            load_status(&runner, Path::new("/repo")),
            Err(Error::StatusOutputTooLarge { .. })
        ));
    }

    #[test]
    fn test_current_branch_trims_output() {
        let runner = FakeRunner::new().respond(
            "git branch --show-current",
            CapturedOutput::ok("  feature/x \n"),
        );
        assert_eq!(
            current_branch(&runner, Path::new("/repo")).unwrap(),
            Some("feature/x".to_string())
        );
    }

    #[test]
    fn test_current_branch_missing_git_is_none() {
        let runner = FakeRunner::new();
        assert_eq!(current_branch(&runner, Path::new("/repo")).unwrap(), None);
    }

    #[test]
    fn test_current_branch_detached_is_none() {
        let runner =
            FakeRunner::new().respond("git branch --show-current", CapturedOutput::ok("\n"));
        assert_eq!(current_branch(&runner, Path::new("/repo")).unwrap(), None);
    }

    #[test]
    fn test_load_status_from_real_repository() {
        let repo = TestRepo::with_git();
        repo.add_file("staged.rs", "fn main() {}");
        repo.add_untracked("loose.txt", "x");

        let index = load_status(&crate::process::SystemRunner, repo.path()).unwrap();
        assert_eq!(
            index.effective_status("staged.rs", false),
            VcsStatus::Staged(Change::Added)
        );
        assert_eq!(
            index.effective_status("loose.txt", false),
            VcsStatus::Untracked
        );
    }
}
