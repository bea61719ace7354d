//! Best-effort LLDB version detection.
//!
//! Tries the `lldb` binary shipped next to the library first, then the
//! library file name. Nothing here fails the run: every problem falls
//! through to the next attempt and finally to [`UNKNOWN_VERSION`].

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::command::CommandRunner;

pub const UNKNOWN_VERSION: &str = "unknown";

static VERSION_OUTPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"version (\d+\.\d+\.\d+)").expect("valid version regex"));

static VERSION_TRIPLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+\.\d+\.\d+)").expect("valid triple regex"));

/// Where to find the version-reporting executable relative to the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionProbe {
    pub tool: String,
    /// Directory of the tool, relative to the library's directory
    pub bin_dir: PathBuf,
    pub flag: String,
}

impl Default for VersionProbe {
    fn default() -> Self {
        Self {
            tool: "lldb".to_string(),
            bin_dir: PathBuf::from("../bin"),
            flag: "--version".to_string(),
        }
    }
}

impl VersionProbe {
    /// Expected tool path for `library`, e.g. `<prefix>/lib/../bin/lldb`.
    pub fn tool_path(&self, library: &Path) -> PathBuf {
        library
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(&self.bin_dir)
            .join(&self.tool)
    }
}

/// Detect the library version, falling back to `"unknown"`.
pub fn detect_version<R: CommandRunner>(
    runner: &R,
    probe: &VersionProbe,
    library: &Path,
) -> String {
    if let Some(version) = version_from_tool(runner, probe, library) {
        return version;
    }

    if let Some(version) = version_from_file_name(library) {
        debug!("Version {} taken from library file name", version);
        return version;
    }

    debug!("Could not determine version of {}", library.display());
    UNKNOWN_VERSION.to_string()
}

fn version_from_tool<R: CommandRunner>(
    runner: &R,
    probe: &VersionProbe,
    library: &Path,
) -> Option<String> {
    let tool = probe.tool_path(library);
    if !tool.exists() {
        debug!("No version tool at {}", tool.display());
        return None;
    }

    let output = match runner.run(tool.as_os_str(), &[OsStr::new(&probe.flag)]) {
        Ok(output) => output,
        Err(e) => {
            debug!("Failed to run {}: {}", tool.display(), e);
            return None;
        }
    };

    if !output.success {
        debug!(
            "{} {} exited with {:?}",
            tool.display(),
            probe.flag,
            output.code
        );
        return None;
    }

    output
        .combined()
        .find_map(parse_version_output)
        .or_else(|| {
            debug!("No version string in {} output", tool.display());
            None
        })
}

/// Extract `X.Y.Z` from output such as `lldb version 21.1.7`.
pub fn parse_version_output(text: &str) -> Option<String> {
    VERSION_OUTPUT
        .captures(text)
        .map(|caps| caps[1].to_string())
}

/// Extract a version triple from the file name (`liblldb.21.1.7.dylib`).
pub fn version_from_file_name(library: &Path) -> Option<String> {
    let name = library.file_name()?.to_string_lossy();
    VERSION_TRIPLE
        .captures(&name)
        .map(|caps| caps[1].to_string())
}
