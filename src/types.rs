//! Small shared types used across the indexing engine: path normalization
//! and the kinds enumerated by the data model (§3).

use serde::{Deserialize, Serialize};

/// One of the kinds a declared symbol can have (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Struct,
    Interface,
    Enum,
    Constant,
    Variable,
    Constructor,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Class => "class",
            SymbolKind::Struct => "struct",
            SymbolKind::Interface => "interface",
            SymbolKind::Enum => "enum",
            SymbolKind::Constant => "constant",
            SymbolKind::Variable => "variable",
            SymbolKind::Constructor => "constructor",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        Some(match s {
            "function" => SymbolKind::Function,
            "method" => SymbolKind::Method,
            "class" => SymbolKind::Class,
            "struct" => SymbolKind::Struct,
            "interface" => SymbolKind::Interface,
            "enum" => SymbolKind::Enum,
            "constant" => SymbolKind::Constant,
            "variable" => SymbolKind::Variable,
            "constructor" => SymbolKind::Constructor,
            _ => return None,
        })
    }
}

/// The quality of match a lenient `find_files` lookup resolved to (§3, §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Recursive,
    CaseInsensitiveRoot,
    CaseInsensitiveRecursive,
    All,
    NoMatch,
    Invalid,
}

/// Normalize a path the way the data model requires everywhere paths are
/// stored or compared: backslashes collapse to `/`, a leading `./` is
/// stripped, and duplicate separators collapse.
pub fn normalize_path(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    let stripped = slashed.strip_prefix("./").unwrap_or(&slashed);

    let mut normalized = String::with_capacity(stripped.len());
    let mut prev_was_slash = false;
    for c in stripped.chars() {
        if c == '/' {
            if prev_was_slash {
                continue;
            }
            prev_was_slash = true;
        } else {
            prev_was_slash = false;
        }
        normalized.push(c);
    }
    normalized
}

/// A symbol identifier: `"<relative_path>::<qualified_name>"` (spec §3).
pub fn symbol_id(relative_path: &str, qualified_name: &str) -> String {
    format!("{}::{}", normalize_path(relative_path), qualified_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_backslashes_and_dot_prefix() {
        assert_eq!(normalize_path("./src\\main.rs"), "src/main.rs");
        assert_eq!(normalize_path("a//b///c"), "a/b/c");
        assert_eq!(normalize_path("plain/path.py"), "plain/path.py");
    }

    #[test]
    fn symbol_id_joins_path_and_name() {
        assert_eq!(symbol_id("src/a.py", "Foo.bar"), "src/a.py::Foo.bar");
    }

    #[test]
    fn symbol_kind_round_trips_through_str() {
        for kind in [
            SymbolKind::Function,
            SymbolKind::Method,
            SymbolKind::Class,
            SymbolKind::Struct,
            SymbolKind::Interface,
            SymbolKind::Enum,
            SymbolKind::Constant,
            SymbolKind::Variable,
            SymbolKind::Constructor,
        ] {
            assert_eq!(SymbolKind::from_str_opt(kind.as_str()), Some(kind));
        }
        assert_eq!(SymbolKind::from_str_opt("bogus"), None);
    }
}
