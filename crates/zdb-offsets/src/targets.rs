//! Reference anchor and the internal LLDB symbols the plugin calls.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// `lldb::SBDebugger::Initialize()`, exported and present in every release
pub const REFERENCE_SYMBOL: &str = "_ZN4lldb10SBDebugger10InitializeEv";

/// Internal symbols as mangled by libc++ builds of LLDB 21.
const BUILTIN_TARGETS: &[(&str, &str)] = &[
    // DataVisualization
    (
        "_ZN12lldb_private17DataVisualization10Categories11GetCategoryENS_11ConstStringERNSt3__110shared_ptrINS_16TypeCategoryImplEEEb",
        "DataVisualization::Categories::GetCategory",
    ),
    (
        "_ZN12lldb_private17DataVisualization10Categories6EnableERKNSt3__110shared_ptrINS_16TypeCategoryImplEEEj",
        "DataVisualization::Categories::Enable",
    ),
    // TypeCategoryImpl
    (
        "_ZN12lldb_private16TypeCategoryImpl14AddTypeSummaryEN4llvm9StringRefEN4lldb18FormatterMatchTypeENSt3__110shared_ptrINS_15TypeSummaryImplEEE",
        "TypeCategoryImpl::AddTypeSummary",
    ),
    (
        "_ZN12lldb_private16TypeCategoryImpl16AddTypeSyntheticEN4llvm9StringRefEN4lldb18FormatterMatchTypeENSt3__110shared_ptrINS_17SyntheticChildrenEEE",
        "TypeCategoryImpl::AddTypeSynthetic",
    ),
    (
        "_ZN12lldb_private16TypeCategoryImpl13AddTypeFormatEN4llvm9StringRefEN4lldb18FormatterMatchTypeENSt3__110shared_ptrINS_14TypeFormatImplEEE",
        "TypeCategoryImpl::AddTypeFormat",
    ),
    (
        "_ZN12lldb_private16TypeCategoryImpl13AddTypeFilterEN4llvm9StringRefEN4lldb18FormatterMatchTypeENSt3__110shared_ptrINS_14TypeFilterImplEEE",
        "TypeCategoryImpl::AddTypeFilter",
    ),
    // CXXFunctionSummaryFormat (C++ summary callbacks)
    (
        "_ZN12lldb_private24CXXFunctionSummaryFormatC2ERKNS_15TypeSummaryImpl5FlagsENSt3__18functionIFbRNS_11ValueObjectERNS_6StreamERKNS_18TypeSummaryOptionsEEEEPKcj",
        "CXXFunctionSummaryFormat::ctor",
    ),
    // FormatManager
    (
        "_ZN12lldb_private13FormatManager11GetCategoryENS_11ConstStringEb",
        "FormatManager::GetCategory",
    ),
    // Synthetic children registration helper
    (
        "_ZN12lldb_private10formatters15AddCXXSyntheticENSt3__110shared_ptrINS_16TypeCategoryImplEEENS1_8functionIFPNS_25SyntheticChildrenFrontEndEPNS_20CXXSyntheticChildrenENS2_INS_11ValueObjectEEEEEEPKcN4llvm9StringRefENS_17SyntheticChildren5FlagsEb",
        "formatters::AddCXXSynthetic",
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSymbol {
    pub mangled: String,
    /// Demangled, human readable name used as the report key
    pub label: String,
}

impl TargetSymbol {
    pub fn new(mangled: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            mangled: mangled.into(),
            label: label.into(),
        }
    }
}

/// Anchor symbol plus the ordered list of symbols to locate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSet {
    pub reference: String,
    pub targets: Vec<TargetSymbol>,
}

impl TargetSet {
    pub fn new(reference: impl Into<String>, targets: Vec<TargetSymbol>) -> Self {
        Self {
            reference: reference.into(),
            targets,
        }
    }

    pub fn target(&self, label: &str) -> Option<&TargetSymbol> {
        self.targets.iter().find(|t| t.label == label)
    }
}

/// Built-in set for LLDB's data formatter internals.
pub fn builtin_targets() -> TargetSet {
    TargetSet::new(
        REFERENCE_SYMBOL,
        BUILTIN_TARGETS
            .iter()
            .map(|(mangled, label)| TargetSymbol::new(*mangled, *label))
            .collect(),
    )
}

pub fn load_targets<P: AsRef<Path>>(path: P) -> Result<TargetSet> {
    let content = fs::read_to_string(&path)?;
    let data = serde_json::from_str(&content)?;
    Ok(data)
}

pub fn save_targets<P: AsRef<Path>>(path: P, targets: &TargetSet) -> Result<()> {
    let content = serde_json::to_string_pretty(targets)?;
    fs::write(path, content)?;
    Ok(())
}
