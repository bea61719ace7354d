//! Subprocess seam used by the symbol loader and the version detector.

use std::ffi::OsStr;
use std::io;
use std::process::Command;

use tracing::debug;

#[cfg(test)]
pub mod mock;

#[cfg(test)]
pub use mock::MockRunner;

/// Captured result of one finished subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code, `None` when the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful run with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed run with the given exit code and stderr
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Iterate stdout first, then stderr.
    pub fn combined(&self) -> impl Iterator<Item = &str> {
        [self.stdout.as_str(), self.stderr.as_str()].into_iter()
    }
}

/// Run an external command to completion and capture its output.
pub trait CommandRunner {
    fn run(&self, program: &OsStr, args: &[&OsStr]) -> io::Result<CommandOutput>;
}

/// Runs commands on the host via `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &OsStr, args: &[&OsStr]) -> io::Result<CommandOutput> {
        debug!("Running {:?} {:?}", program, args);

        let output = Command::new(program).args(args).output()?;

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
