//! Synchronous call-and-capture for external commands.
//!
//! Everything lg learns from git or du goes through [`CommandRunner`], so tests can
//! feed canned output without spawning processes.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Command, Stdio};

/// Output of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Captured stdout, at most the requested limit.
    pub stdout: Vec<u8>,
    /// True when the child exited normally with status 0.
    pub success: bool,
    /// True when the child wrote more than the limit and the excess was discarded.
    pub truncated: bool,
}

impl CapturedOutput {
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            success: true,
            truncated: false,
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }
}

pub trait CommandRunner {
    /// Run `program` with `args` in `cwd`, capturing at most `limit` bytes of stdout.
    ///
    /// Blocks until the child has exited. An `Err` means the process could not be
    /// started or its pipe could not be read; a non-zero exit is reported through
    /// [`CapturedOutput::success`].
    fn run(
        &self,
        program: &str,
        args: &[OsString],
        cwd: &Path,
        limit: usize,
    ) -> io::Result<CapturedOutput>;
}

/// Runs real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        program: &str,
        args: &[OsString],
        cwd: &Path,
        limit: usize,
    ) -> io::Result<CapturedOutput> {
        log::debug!("running {} {:?} in {}", program, args, cwd.display());

        let mut child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let read_result = match child.stdout.take() {
            Some(stdout) => read_capped(stdout, limit),
            None => Ok((Vec::new(), false)),
        };
        // Reap the child even when reading failed.
        let status = child.wait()?;
        let (stdout, truncated) = read_result?;

        if truncated {
            log::debug!("{} output truncated at {} bytes", program, limit);
        }

        Ok(CapturedOutput {
            stdout,
            success: status.success(),
            truncated,
        })
    }
}

/// Read up to `limit` bytes, then drain the rest so the writer never blocks.
fn read_capped(mut reader: impl Read, limit: usize) -> io::Result<(Vec<u8>, bool)> {
    let mut buf = Vec::new();
    (&mut reader).take(limit as u64).read_to_end(&mut buf)?;
    let excess = io::copy(&mut reader, &mut io::sink())?;
    Ok((buf, excess > 0))
}
