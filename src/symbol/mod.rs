//! Core data model (spec §3): one record per declared symbol, one record
//! per parsed file, and the result/pagination shapes returned by queries.

use crate::types::{normalize_path, MatchType, SymbolKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One record per declared symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolInfo {
    pub kind: SymbolKind,
    /// Project-relative path, forward-slash normalized.
    pub file: String,
    /// 1-based line of the declaration header.
    pub line: u32,
    /// One-line textual signature as it appears in source, trimmed.
    pub signature: Option<String>,
    /// Associated documentation. Absent is `None`, never an empty string.
    pub docstring: Option<String>,
    /// Ordered, duplicate-free list of caller symbol IDs.
    pub called_by: Vec<String>,
}

impl SymbolInfo {
    pub fn new(kind: SymbolKind, file: impl Into<String>, line: u32) -> Self {
        Self {
            kind,
            file: normalize_path(&file.into()),
            line,
            signature: None,
            docstring: None,
            called_by: Vec::new(),
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        let trimmed = signature.into().trim().to_string();
        self.signature = if trimmed.is_empty() { None } else { Some(trimmed) };
        self
    }

    pub fn with_docstring(mut self, docstring: Option<String>) -> Self {
        self.docstring = docstring.filter(|d| !d.is_empty());
        self
    }

    /// Record a caller, preserving first-seen order and de-duplicating.
    pub fn add_caller(&mut self, caller_id: &str) {
        if !self.called_by.iter().any(|c| c == caller_id) {
            self.called_by.push(caller_id.to_string());
        }
    }
}

/// Name-list summary used by `FileInfo.symbols`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolNames {
    pub functions: Vec<String>,
    pub classes: Vec<String>,
}

/// One record per parsed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub language: String,
    pub line_count: u32,
    pub package: Option<String>,
    /// Ordered, deduplicated (first occurrence kept) list of imports.
    pub imports: Vec<String>,
    pub symbols: SymbolNames,
    /// Call sites whose callee could not be resolved within this file:
    /// `(caller_id, callee_simple_name)`.
    pub pending_calls: Vec<(String, String)>,
}

impl FileInfo {
    pub fn new(language: impl Into<String>, line_count: u32) -> Self {
        Self {
            language: language.into(),
            line_count,
            package: None,
            imports: Vec::new(),
            symbols: SymbolNames::default(),
            pending_calls: Vec::new(),
        }
    }

    /// Record an import, preserving first occurrence and skipping duplicates.
    pub fn add_import(&mut self, import: impl Into<String>) {
        let import = import.into();
        if !self.imports.iter().any(|i| i == &import) {
            self.imports.push(import);
        }
    }
}

/// Result of a shallow `find_files` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSearchResult {
    pub files: Vec<String>,
    pub match_type: MatchType,
    pub original_pattern: String,
    pub applied_pattern: String,
}

/// Pagination metadata returned alongside a windowed result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub total_matches: usize,
    pub returned: usize,
    pub start_index: usize,
    pub end_index: usize,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
}

/// A parsed file's full symbol table, keyed by symbol ID, as returned by
/// a parsing strategy.
pub type SymbolTable = BTreeMap<String, SymbolInfo>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_caller_is_duplicate_free_and_ordered() {
        let mut sym = SymbolInfo::new(SymbolKind::Function, "a.py", 1);
        sym.add_caller("a.py::foo");
        sym.add_caller("a.py::bar");
        sym.add_caller("a.py::foo");
        assert_eq!(sym.called_by, vec!["a.py::foo", "a.py::bar"]);
    }

    #[test]
    fn with_signature_trims_and_empty_becomes_none() {
        let sym = SymbolInfo::new(SymbolKind::Function, "a.py", 1)
            .with_signature("  def f():  \n");
        assert_eq!(sym.signature.as_deref(), Some("def f():"));

        let sym2 = SymbolInfo::new(SymbolKind::Function, "a.py", 1).with_signature("   ");
        assert_eq!(sym2.signature, None);
    }

    #[test]
    fn with_docstring_empty_string_is_none() {
        let sym = SymbolInfo::new(SymbolKind::Function, "a.py", 1)
            .with_docstring(Some(String::new()));
        assert_eq!(sym.docstring, None);
    }

    #[test]
    fn file_info_add_import_dedupes_preserving_first_occurrence() {
        let mut fi = FileInfo::new("python", 10);
        fi.add_import("os");
        fi.add_import("sys");
        fi.add_import("os");
        assert_eq!(fi.imports, vec!["os", "sys"]);
    }

    #[test]
    fn file_normalizes_path() {
        let sym = SymbolInfo::new(SymbolKind::Function, "./src\\a.py", 1);
        assert_eq!(sym.file, "src/a.py");
    }
}
