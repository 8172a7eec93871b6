//! Recursive directory sizes via one batched `du -skl` call.

use std::ffi::OsString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use crate::entry::FileEntry;
use crate::error::{Error, Result};
use crate::process::CommandRunner;

/// Cap on captured size output. Anything past it is discarded.
pub const SIZE_OUTPUT_LIMIT: usize = 10 * 1024 * 1024;

const SIZE_TOOL: &str = "du";

pub struct DirectorySizer<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> DirectorySizer<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Fill in `size` for every directory entry of `base`.
    ///
    /// The `.` entry stands for `base` itself. A path starting with `-` is rejected
    /// before anything runs. A missing tool or a failed run leaves sizes untouched.
    pub fn apply(&self, base: &Path, entries: &mut [FileEntry]) -> Result<()> {
        let targets: Vec<(usize, PathBuf)> = entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_dir())
            .map(|(i, e)| {
                let path = if e.name == "." {
                    base.to_path_buf()
                } else {
                    base.join(&e.name)
                };
                (i, path)
            })
            .collect();

        if let Some((_, path)) = targets
            .iter()
            .find(|(_, p)| p.as_os_str().as_bytes().first() == Some(&b'-'))
        {
            return Err(Error::UnsafeSizePath { path: path.clone() });
        }

        if targets.is_empty() {
            return Ok(());
        }

        // `-l` counts shared inodes once per argument. Without it `du` skips a child
        // already measured as part of `.` and prints no line for it.
        let mut args: Vec<OsString> = vec!["-skl".into()];
        args.extend(targets.iter().map(|(_, p)| p.as_os_str().to_os_string()));

        // Target paths already include `base`, so run from the current directory.
        let output = match self.runner.run(SIZE_TOOL, &args, Path::new("."), SIZE_OUTPUT_LIMIT) {
            Ok(o) => o,
            Err(e) => {
                log::debug!("{} unavailable: {}", SIZE_TOOL, e);
                return Ok(());
            }
        };
        if !output.success {
            log::debug!("{} failed, leaving directory sizes unset", SIZE_TOOL);
            return Ok(());
        }

        for line in output.stdout.split(|&b| b == b'\n') {
            let Some((kilobytes, reported)) = parse_size_line(line) else {
                continue;
            };
            for (index, path) in &targets {
                if path.as_os_str().as_bytes() == reported {
                    entries[*index].size = kilobytes.saturating_mul(1024);
                }
            }
        }
        Ok(())
    }
}

/// Split `<kilobytes><whitespace><path>`. Lines with a non-numeric size are rejected.
fn parse_size_line(line: &[u8]) -> Option<(u64, &[u8])> {
    let split = line.iter().position(|b| b.is_ascii_whitespace())?;
    let kilobytes = std::str::from_utf8(&line[..split]).ok()?.parse().ok()?;
    let path = &line[split + 1..];
    if path.is_empty() {
        return None;
    }
    Some((kilobytes, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::FileKind;
    use crate::process::CapturedOutput;
    use crate::process::fake::FakeRunner;
    use crate::process::SystemRunner;
    use crate::test_utils::incompressible_bytes;
    use std::fs;
    use tempfile::TempDir;

    fn dir(name: &str) -> FileEntry {
        FileEntry::new(name, FileKind::Directory)
    }

    #[test]
    fn test_single_directory_size() {
        let runner =
            FakeRunner::new().respond("du -skl /base/dir", CapturedOutput::ok("512\t/base/dir\n"));
        let mut entries = vec![dir("dir")];
        DirectorySizer::new(&runner)
            .apply(Path::new("/base"), &mut entries)
            .unwrap();
        assert_eq!(entries[0].size, 524288);
    }

    #[test]
    fn test_self_entry_maps_to_base() {
        let runner = FakeRunner::new().respond(
            "du -skl /base /base/a",
            CapturedOutput::ok("8\t/base\n4\t/base/a\n"),
        );
        let mut entries = vec![dir("."), dir("a")];
        DirectorySizer::new(&runner)
            .apply(Path::new("/base"), &mut entries)
            .unwrap();
        assert_eq!(entries[0].size, 8192);
        assert_eq!(entries[1].size, 4096);
    }

    #[test]
    fn test_no_directories_means_no_call() {
        let runner = FakeRunner::new();
        let mut entries = vec![FileEntry::new("f", FileKind::RegularFile { executable: false })];
        DirectorySizer::new(&runner)
            .apply(Path::new("/base"), &mut entries)
            .unwrap();
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_dash_path_rejected_before_running() {
        let runner = FakeRunner::new();
        let mut entries = vec![dir(".")];
        let result = DirectorySizer::new(&runner).apply(Path::new("-rf"), &mut entries);
        assert!(matches!(result, Err(Error::UnsafeSizePath { .. })));
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_failed_run_leaves_sizes_unset() {
        let runner = FakeRunner::new().respond("du -skl /base/dir", CapturedOutput {
            stdout: b"512\t/base/dir\n".to_vec(),
            success: false,
            truncated: false,
        });
        let mut entries = vec![dir("dir")];
        DirectorySizer::new(&runner)
            .apply(Path::new("/base"), &mut entries)
            .unwrap();
        assert_eq!(entries[0].size, 0);
    }

    #[test]
    fn test_missing_tool_is_not_an_error() {
        let runner = FakeRunner::new();
        let mut entries = vec![dir("dir")];
        DirectorySizer::new(&runner)
            .apply(Path::new("/base"), &mut entries)
            .unwrap();
        assert_eq!(entries[0].size, 0);
    }

    #[test]
    fn test_bad_lines_skipped_and_size_saturates() {
        let runner = FakeRunner::new().respond(
            "du -skl /base/a /base/b",
            CapturedOutput::ok("du: cannot read\nabc\t/base/a\n18446744073709551615\t/base/b\n"),
        );
        let mut entries = vec![dir("a"), dir("b")];
        DirectorySizer::new(&runner)
            .apply(Path::new("/base"), &mut entries)
            .unwrap();
        assert_eq!(entries[0].size, 0);
        assert_eq!(entries[1].size, u64::MAX);
    }

    #[test]
    fn test_parse_size_line() {
        assert_eq!(
            parse_size_line(b"12\tpath with space"),
            Some((12, &b"path with space"[..]))
        );
        assert_eq!(parse_size_line(b"12"), None);
        assert_eq!(parse_size_line(b""), None);
        assert_eq!(parse_size_line(b"x 1"), None);
    }

    #[test]
    fn test_real_du_measures_directory() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("data")).unwrap();
        fs::write(tmp.path().join("data/blob"), incompressible_bytes(64 * 1024)).unwrap();

        let mut entries = vec![dir("data")];
        DirectorySizer::new(&SystemRunner)
            .apply(tmp.path(), &mut entries)
            .unwrap();
        assert!(entries[0].size > 0);
        assert_eq!(entries[0].size % 1024, 0);
    }

    #[test]
    fn test_real_du_sizes_children_alongside_self() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("data")).unwrap();
        fs::write(tmp.path().join("data/blob"), incompressible_bytes(100 * 1024)).unwrap();

        let mut entries = vec![dir("."), dir("data")];
        DirectorySizer::new(&SystemRunner)
            .apply(tmp.path(), &mut entries)
            .unwrap();
        assert!(entries[1].size >= 100 * 1024, "child got {}", entries[1].size);
        assert!(entries[0].size >= entries[1].size);
    }
}
