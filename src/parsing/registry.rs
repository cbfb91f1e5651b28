//! Extension → strategy lookup (spec §4.1: "a central registry maps
//! extensions to strategy instances").

use super::ParsingStrategy;
use std::collections::HashMap;
use std::sync::Arc;

pub struct StrategyRegistry {
    by_extension: HashMap<&'static str, Arc<dyn ParsingStrategy>>,
}

impl StrategyRegistry {
    /// The registry used by the deep index builder: one entry per
    /// extension, covering every strategy named in spec §4.1 plus Rust
    /// (a value-add the registry's open design doesn't preclude).
    pub fn standard() -> Self {
        let mut registry = Self {
            by_extension: HashMap::new(),
        };
        registry.register(Arc::new(super::python::PythonStrategy));
        registry.register(Arc::new(super::go::GoStrategy));
        registry.register(Arc::new(super::javascript::JavaScriptStrategy));
        registry.register(Arc::new(super::typescript::TypeScriptStrategy));
        registry.register(Arc::new(super::kotlin::KotlinStrategy));
        registry.register(Arc::new(super::csharp::CSharpStrategy));
        registry.register(Arc::new(super::rust_lang::RustStrategy));
        registry
    }

    pub fn register(&mut self, strategy: Arc<dyn ParsingStrategy>) {
        for ext in strategy.extensions() {
            self.by_extension.insert(ext, strategy.clone());
        }
    }

    /// Look up the strategy for a file by its extension (no leading dot).
    pub fn for_extension(&self, extension: &str) -> Option<Arc<dyn ParsingStrategy>> {
        self.by_extension.get(extension).cloned()
    }

    /// Look up the strategy for a path based on its extension.
    pub fn for_path(&self, path: &std::path::Path) -> Option<Arc<dyn ParsingStrategy>> {
        let ext = path.extension()?.to_str()?;
        self.for_extension(ext)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn resolves_known_extensions() {
        let registry = StrategyRegistry::standard();
        assert!(registry.for_path(Path::new("a/b.py")).is_some());
        assert!(registry.for_path(Path::new("a/b.go")).is_some());
        assert!(registry.for_path(Path::new("a/b.ts")).is_some());
        assert!(registry.for_path(Path::new("a/b.tsx")).is_some());
        assert!(registry.for_path(Path::new("a/b.js")).is_some());
        assert!(registry.for_path(Path::new("a/b.kt")).is_some());
        assert!(registry.for_path(Path::new("a/b.cs")).is_some());
        assert!(registry.for_path(Path::new("a/b.rs")).is_some());
    }

    #[test]
    fn unregistered_extension_returns_none() {
        let registry = StrategyRegistry::standard();
        assert!(registry.for_path(Path::new("a/b.unknown_ext")).is_none());
        assert!(registry.for_path(Path::new("a/README")).is_none());
    }
}
