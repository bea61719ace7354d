//! Offset report written for the LLDB plugin, and the helpers the plugin
//! side needs to read it back.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Resolved location of one internal symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub mangled: String,
    /// Absolute address as listed by `nm`
    #[serde(with = "hex_address")]
    pub offset: u64,
    /// `offset - reference_offset`, negative when the symbol sits below the anchor
    #[serde(with = "hex_relative")]
    pub relative: i64,
}

/// Label -> entry map in target order. Absent symbols are kept as `None` so
/// the plugin can tell "not found" apart from "not asked for".
pub type SymbolMap = IndexMap<String, Option<SymbolEntry>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetReport {
    pub version: String,
    pub reference_symbol: String,
    #[serde(with = "hex_address")]
    pub reference_offset: u64,
    pub symbols: SymbolMap,
}

impl OffsetReport {
    /// Entry for `label`; `None` both when unknown and when recorded as missing.
    pub fn entry(&self, label: &str) -> Option<&SymbolEntry> {
        self.symbols.get(label).and_then(Option::as_ref)
    }

    /// Labels of targets that were not found, in target order
    pub fn missing(&self) -> Vec<&str> {
        self.symbols
            .iter()
            .filter(|(_, entry)| entry.is_none())
            .map(|(label, _)| label.as_str())
            .collect()
    }

    pub fn found_count(&self) -> usize {
        self.symbols.values().filter(|entry| entry.is_some()).count()
    }

    /// Runtime address of `label` given the runtime address of the reference
    /// symbol (as returned by `dlsym`).
    pub fn resolve_address(&self, label: &str, runtime_reference: u64) -> Option<u64> {
        self.entry(label)
            .map(|entry| runtime_reference.wrapping_add_signed(entry.relative))
    }

    /// Pretty JSON with two-space indentation
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

pub fn load_report<P: AsRef<Path>>(path: P) -> Result<OffsetReport> {
    let content = fs::read_to_string(path)?;
    OffsetReport::from_json(&content)
}

/// File name consumers look for, e.g. `lldb-21.1.7.json`
pub fn report_file_name(version: &str) -> String {
    format!("lldb-{}.json", version)
}

mod hex_address {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::hex::format_address(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::hex::parse_address(&s).map_err(D::Error::custom)
    }
}

mod hex_relative {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::hex::format_relative(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::hex::parse_relative(&s).map_err(D::Error::custom)
    }
}
