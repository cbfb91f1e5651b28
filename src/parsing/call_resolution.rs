//! Cross-file call resolution (spec §4.1 tie-breaks, §4.2 pass).
//!
//! Each strategy records unresolved call sites on `FileInfo.pending_calls`
//! as `(caller_id, callee_simple_name)`. After every file in a build has
//! been parsed, the builder runs a single global pass over all pending
//! calls against a simple-name → symbol-id index built from every parsed
//! file (see `indexing::builder`).

use std::collections::HashMap;

/// A global simple-name → symbol-id multi-index, used to resolve pending
/// calls left behind by per-file parsing.
#[derive(Debug, Default)]
pub struct GlobalNameIndex {
    /// simple name (final `.`-segment or the whole name for free functions)
    /// → every full symbol id that ends with it.
    by_simple_name: HashMap<String, Vec<String>>,
}

impl GlobalNameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a symbol id under every name it could sensibly be called
    /// by: the full qualified name after the file-path prefix, and its
    /// simple (final segment) name.
    pub fn insert(&mut self, symbol_id: &str) {
        let qualified = symbol_id.rsplit_once("::").map(|(_, q)| q).unwrap_or(symbol_id);
        let simple = qualified.rsplit('.').next().unwrap_or(qualified);

        self.by_simple_name
            .entry(qualified.to_string())
            .or_default()
            .push(symbol_id.to_string());
        if simple != qualified {
            self.by_simple_name
                .entry(simple.to_string())
                .or_default()
                .push(symbol_id.to_string());
        }
    }

    /// Resolve one pending call using the tie-break rules (spec §4.1):
    /// 1. Exact name match.
    /// 2. Unique match ending in `.<simple_name>`.
    /// Otherwise, drop it (return `None`).
    pub fn resolve(&self, simple_name: &str) -> Option<&str> {
        if let Some(ids) = self.by_simple_name.get(simple_name) {
            if ids.len() == 1 {
                return Some(&ids[0]);
            }
        }

        let suffix = format!(".{simple_name}");
        let mut matches: Vec<&str> = self
            .by_simple_name
            .iter()
            .filter(|(name, _)| name.ends_with(&suffix) || name.as_str() == simple_name)
            .flat_map(|(_, ids)| ids.iter().map(String::as_str))
            .collect();
        matches.dedup();

        if matches.len() == 1 {
            Some(matches[0])
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_unique_simple_name() {
        let mut index = GlobalNameIndex::new();
        index.insert("a.go::Add");
        let resolved = index.resolve("Add");
        assert_eq!(resolved, Some("a.go::Add"));
    }

    #[test]
    fn resolves_unique_dotted_suffix() {
        let mut index = GlobalNameIndex::new();
        index.insert("a.py::Greeter.helper");
        let resolved = index.resolve("helper");
        assert_eq!(resolved, Some("a.py::Greeter.helper"));
    }

    #[test]
    fn ambiguous_simple_name_is_dropped() {
        let mut index = GlobalNameIndex::new();
        index.insert("a.py::Foo.run");
        index.insert("b.py::Bar.run");
        assert_eq!(index.resolve("run"), None);
    }

    #[test]
    fn no_match_returns_none() {
        let index = GlobalNameIndex::new();
        assert_eq!(index.resolve("nothing"), None);
    }
}
