//! Offset resolution against the reference anchor.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::command::CommandRunner;
use crate::error::{Error, Result};
use crate::hex::relative_offset;
use crate::report::{OffsetReport, SymbolEntry, SymbolMap};
use crate::symbols::{DEFAULT_NM_TOOL, DuplicatePolicy, SymbolTable, load_symbol_table};
use crate::targets::TargetSet;
use crate::version::{UNKNOWN_VERSION, VersionProbe, detect_version};

/// Knobs for a full dump run
#[derive(Debug, Clone)]
pub struct DumpOptions {
    pub nm_tool: String,
    pub probe: VersionProbe,
    pub duplicates: DuplicatePolicy,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            nm_tool: DEFAULT_NM_TOOL.to_string(),
            probe: VersionProbe::default(),
            duplicates: DuplicatePolicy::default(),
        }
    }
}

/// Build the report for `targets` from an already loaded symbol table.
///
/// Fails only when the reference symbol is missing. Missing targets are
/// recorded as `None` and logged.
pub fn resolve_offsets(
    table: &SymbolTable,
    targets: &TargetSet,
    version: impl Into<String>,
) -> Result<OffsetReport> {
    let reference_offset = table
        .lookup(&targets.reference)
        .ok_or_else(|| Error::ReferenceNotFound(targets.reference.clone()))?;

    debug!("Reference {} at {:#x}", targets.reference, reference_offset);

    let mut symbols = SymbolMap::new();
    for target in &targets.targets {
        let entry = table.lookup(&target.mangled).map(|offset| SymbolEntry {
            mangled: target.mangled.clone(),
            offset,
            relative: relative_offset(offset, reference_offset),
        });

        if entry.is_none() {
            warn!("{} not found", target.label);
        }
        symbols.insert(target.label.clone(), entry);
    }

    Ok(OffsetReport {
        version: version.into(),
        reference_symbol: targets.reference.clone(),
        reference_offset,
        symbols,
    })
}

/// Dump `library` with `nm`, resolve `targets` and detect the version.
pub fn dump_offsets<R: CommandRunner>(
    runner: &R,
    library: &Path,
    targets: &TargetSet,
    options: &DumpOptions,
) -> Result<OffsetReport> {
    let table = load_symbol_table(runner, &options.nm_tool, library, options.duplicates)?;

    let mut report = resolve_offsets(&table, targets, UNKNOWN_VERSION)?;
    report.version = detect_version(runner, &options.probe, library);

    info!(
        "Resolved {}/{} symbols (version: {})",
        report.found_count(),
        report.symbols.len(),
        report.version
    );
    Ok(report)
}
