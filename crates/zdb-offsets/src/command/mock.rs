//! In-memory `CommandRunner` for tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::io;

use super::{CommandOutput, CommandRunner};

/// Replays canned output keyed by program name and records every call.
///
/// Programs without a canned response fail with `NotFound`, the same way a
/// missing executable does.
#[derive(Debug, Default)]
pub struct MockRunner {
    responses: HashMap<OsString, CommandOutput>,
    calls: RefCell<Vec<(OsString, Vec<OsString>)>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, program: impl AsRef<OsStr>, output: CommandOutput) -> Self {
        self.responses.insert(program.as_ref().to_os_string(), output);
        self
    }

    /// Calls made so far, in order
    pub fn calls(&self) -> Vec<(OsString, Vec<OsString>)> {
        self.calls.borrow().clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &OsStr, args: &[&OsStr]) -> io::Result<CommandOutput> {
        self.calls.borrow_mut().push((
            program.to_os_string(),
            args.iter().map(|a| a.to_os_string()).collect(),
        ));

        self.responses.get(program).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no canned output for {:?}", program),
            )
        })
    }
}
