//! # zdb-offsets
//!
//! Extracts the offsets of internal (non-exported) LLDB symbols relative to a
//! stable exported anchor, so an out-of-process plugin can call them through
//! address arithmetic.
//!
//! This crate provides:
//! - A narrow subprocess seam (`CommandRunner`) for `nm` and `lldb --version`
//! - `nm` output parsing into a `SymbolTable`
//! - The built-in LLDB `TargetSet` and its JSON persistence
//! - Library version detection
//! - Offset resolution into an `OffsetReport`, plus helpers for consumers
//!   that read the report back

pub mod command;
pub mod error;
pub mod hex;
pub mod report;
pub mod resolver;
pub mod symbols;
pub mod targets;
pub mod version;

pub use command::{CommandOutput, CommandRunner, SystemRunner};
pub use error::{Error, Result};
pub use hex::{format_address, format_relative, parse_address, parse_relative};
pub use report::{OffsetReport, SymbolEntry, SymbolMap, load_report, report_file_name};
pub use resolver::{DumpOptions, dump_offsets, resolve_offsets};
pub use symbols::{DEFAULT_NM_TOOL, DuplicatePolicy, SymbolTable, load_symbol_table};
pub use targets::{
    REFERENCE_SYMBOL, TargetSet, TargetSymbol, builtin_targets, load_targets, save_targets,
};
pub use version::{UNKNOWN_VERSION, VersionProbe, detect_version};
