//! Parsing strategy framework (spec §4.1).
//!
//! Each language strategy implements [`ParsingStrategy`], turning a file's
//! relative path and text content into a symbol table plus a [`FileInfo`]
//! summary. A [`StrategyRegistry`] maps file extensions to strategy
//! instances; unregistered extensions fall back to a minimal "unknown"
//! parse that still counts the file in the inventory.

pub mod call_resolution;
pub mod csharp;
pub mod go;
pub mod javascript;
pub mod kotlin;
pub mod python;
pub mod registry;
pub mod rust_lang;
pub mod typescript;

use crate::symbol::{FileInfo, SymbolTable};

pub use registry::StrategyRegistry;

/// Contract every per-language parser implements (spec §4.1).
pub trait ParsingStrategy: Send + Sync {
    /// The language name recorded on `FileInfo.language`.
    fn language_name(&self) -> &'static str;

    /// File extensions (without the leading dot) this strategy handles.
    fn extensions(&self) -> &'static [&'static str];

    /// Parse `content` from a file at `relative_path`, returning the
    /// extracted symbol table and file summary.
    fn parse_file(&self, relative_path: &str, content: &str) -> (SymbolTable, FileInfo);
}

/// Build the minimal `FileInfo` used for files with no registered strategy:
/// "unknown" language, no symbols, but still counted in the file inventory.
pub fn unknown_file_info(content: &str) -> FileInfo {
    FileInfo::new("unknown", content.lines().count() as u32)
}
