//! Symbol table built from `nm` output.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::ffi::OsStr;
use std::path::Path;

use tracing::{debug, trace};

use crate::command::CommandRunner;
use crate::error::{Error, Result};

/// Symbol listing tool invoked against the library
pub const DEFAULT_NM_TOOL: &str = "nm";

/// What to do when `nm` lists the same name more than once.
///
/// Weak and local aliases can show up under one name at different
/// addresses. `LastWins` keeps the address of the final line, which is what
/// earlier offset files were generated with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    #[default]
    LastWins,
    FirstWins,
}

/// Name to address mapping for one library image.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, u64>,
    duplicates: usize,
}

impl SymbolTable {
    /// Parse `nm` output.
    ///
    /// Each line needs at least three whitespace separated tokens:
    /// address (hex), type code and name. Anything after the name is
    /// ignored. Shorter lines (undefined symbols have no address) and lines
    /// with a non-hex address are skipped.
    pub fn parse(output: &str, policy: DuplicatePolicy) -> Self {
        let mut table = Self::default();

        for line in output.lines() {
            let mut tokens = line.split_whitespace();
            let (Some(addr), Some(_kind), Some(name)) =
                (tokens.next(), tokens.next(), tokens.next())
            else {
                continue;
            };

            let Ok(address) = u64::from_str_radix(addr, 16) else {
                trace!("Skipping line with non-hex address: {}", line);
                continue;
            };

            table.insert(normalize_name(name), address, policy);
        }

        table
    }

    fn insert(&mut self, name: &str, address: u64, policy: DuplicatePolicy) {
        match self.symbols.entry(name.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(address);
            }
            Entry::Occupied(mut slot) => {
                self.duplicates += 1;
                let previous = *slot.get();
                if previous != address {
                    debug!(
                        "Duplicate symbol {} at {:#x} and {:#x} ({:?})",
                        name, previous, address, policy
                    );
                }
                if policy == DuplicatePolicy::LastWins {
                    slot.insert(address);
                }
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.symbols.get(name).copied()
    }

    /// Look up a mangled name as written in a target list.
    ///
    /// Mach-O listings (`__ZN...`) normalize to the exact name. ELF listings
    /// carry no extra underscore, so `_ZN...` was stored as `ZN...`; fall
    /// back to the normalized form to find those.
    pub fn lookup(&self, name: &str) -> Option<u64> {
        self.get(name).or_else(|| self.get(normalize_name(name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of lines that repeated an already seen name
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }
}

impl FromIterator<(String, u64)> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut table = Self::default();
        for (name, address) in iter {
            table.insert(&name, address, DuplicatePolicy::LastWins);
        }
        table
    }
}

/// Strip the single leading underscore Mach-O adds to C symbol names.
pub fn normalize_name(name: &str) -> &str {
    name.strip_prefix('_').unwrap_or(name)
}

/// Run `tool` against `library` and parse its listing.
pub fn load_symbol_table<R: CommandRunner>(
    runner: &R,
    tool: &str,
    library: &Path,
    policy: DuplicatePolicy,
) -> Result<SymbolTable> {
    let output = runner
        .run(OsStr::new(tool), &[library.as_os_str()])
        .map_err(|source| Error::Spawn {
            program: tool.to_string(),
            source,
        })?;

    if !output.success {
        return Err(Error::SymbolDump {
            tool: tool.to_string(),
            code: output.code,
            stderr: output.stderr.trim_end().to_string(),
        });
    }

    let table = SymbolTable::parse(&output.stdout, policy);
    debug!(
        "Loaded {} symbols from {} ({} duplicates)",
        table.len(),
        library.display(),
        table.duplicates()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CommandOutput, MockRunner};

    const SAMPLE: &str = "\
0000000000001000 T __ZN4lldb10SBDebugger10InitializeEv
0000000000002000 t __ZN12lldb_private13FormatManager11GetCategoryENS_11ConstStringEb
                 U _malloc
0000000000003000 T _plain_c_symbol
0000000000004000 T NoUnderscore
";

    #[test]
    fn test_parse_strips_one_underscore() {
        let table = SymbolTable::parse(SAMPLE, DuplicatePolicy::LastWins);
        assert_eq!(table.get("_ZN4lldb10SBDebugger10InitializeEv"), Some(0x1000));
        assert_eq!(table.get("plain_c_symbol"), Some(0x3000));
        assert_eq!(table.get("NoUnderscore"), Some(0x4000));
        assert!(!table.contains("__ZN4lldb10SBDebugger10InitializeEv"));
    }

    #[test]
    fn test_parse_skips_short_lines() {
        let table = SymbolTable::parse(SAMPLE, DuplicatePolicy::LastWins);
        assert!(!table.contains("malloc"));
        assert!(!table.contains("U"));
        assert_eq!(table.len(), 4);

        let table = SymbolTable::parse("\n1000\n1000 T\n   \n", DuplicatePolicy::LastWins);
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_ignores_trailing_tokens() {
        let table = SymbolTable::parse("1f00 T _foo extra tokens", DuplicatePolicy::LastWins);
        assert_eq!(table.get("foo"), Some(0x1f00));
    }

    #[test]
    fn test_parse_skips_non_hex_address() {
        let listing = "libfoo.dylib(a.o): T _x\n10 T _y";
        let table = SymbolTable::parse(listing, DuplicatePolicy::LastWins);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("y"), Some(0x10));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("_Foo"), "Foo");
        assert_eq!(normalize_name("Foo"), "Foo");
        assert_eq!(normalize_name("__Z3foov"), "_Z3foov");
    }

    #[test]
    fn test_lookup_matches_macho_and_elf_listings() {
        let macho = SymbolTable::parse(
            "1000 T __ZN4lldb10SBDebugger10InitializeEv",
            DuplicatePolicy::LastWins,
        );
        let elf = SymbolTable::parse(
            "1000 T _ZN4lldb10SBDebugger10InitializeEv",
            DuplicatePolicy::LastWins,
        );

        assert_eq!(macho.lookup("_ZN4lldb10SBDebugger10InitializeEv"), Some(0x1000));
        assert_eq!(elf.lookup("_ZN4lldb10SBDebugger10InitializeEv"), Some(0x1000));
        assert_eq!(elf.get("_ZN4lldb10SBDebugger10InitializeEv"), None);
        assert_eq!(elf.lookup("_ZN4lldb10SBDebugger9TerminateEv"), None);
    }

    #[test]
    fn test_duplicate_policy() {
        let listing = "1000 T _dup\n2000 W _dup\n";

        let last = SymbolTable::parse(listing, DuplicatePolicy::LastWins);
        assert_eq!(last.get("dup"), Some(0x2000));
        assert_eq!(last.duplicates(), 1);

        let first = SymbolTable::parse(listing, DuplicatePolicy::FirstWins);
        assert_eq!(first.get("dup"), Some(0x1000));
        assert_eq!(first.duplicates(), 1);
    }

    #[test]
    fn test_load_symbol_table_runs_tool_on_library() {
        let runner = MockRunner::new().with("nm", CommandOutput::ok(SAMPLE));
        let path = Path::new("/opt/llvm/lib/liblldb.dylib");

        let table = load_symbol_table(&runner, "nm", path, DuplicatePolicy::LastWins).unwrap();
        assert_eq!(table.len(), 4);

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "nm");
        assert_eq!(calls[0].1, vec![path.as_os_str().to_os_string()]);
    }

    #[test]
    fn test_load_symbol_table_tool_failure() {
        let runner = MockRunner::new().with(
            "nm",
            CommandOutput::failed(1, "nm: error: liblldb.dylib: No such file or directory\n"),
        );

        let library = Path::new("liblldb.dylib");
        let err = load_symbol_table(&runner, "nm", library, DuplicatePolicy::LastWins).unwrap_err();
        match err {
            Error::SymbolDump { tool, code, stderr } => {
                assert_eq!(tool, "nm");
                assert_eq!(code, Some(1));
                assert_eq!(stderr, "nm: error: liblldb.dylib: No such file or directory");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_symbol_table_tool_missing() {
        let runner = MockRunner::new();
        let library = Path::new("liblldb.dylib");
        let err = load_symbol_table(&runner, "nm", library, DuplicatePolicy::LastWins).unwrap_err();
        assert!(err.is_not_found());
    }
}
