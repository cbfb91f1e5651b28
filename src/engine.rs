//! The top-level engine (spec §6 "Exposed operations"): wires the deep
//! and shallow indexes behind the operations the tool layer and CLI
//! consume.

use crate::config::{IndexingConfig, Settings};
use crate::discovery::FileDiscoveryService;
use crate::error::{IndexError, IndexResult, ValidationError, ValidationResult};
use crate::indexing::IndexBuilder;
use crate::search::{self, SearchRow};
use crate::shallow::ShallowIndexManager;
use crate::storage::DeepIndexStore;
use crate::symbol::{FileSearchResult, PaginationInfo};
use crate::types::MatchType;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct SymbolRecord {
    pub name: String,
    pub kind: &'static str,
    pub line: u32,
    pub signature: Option<String>,
    pub docstring: Option<String>,
    pub called_by: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub language: String,
    pub symbol_count: usize,
    pub symbols: Vec<SymbolRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub status: String,
    pub indexed_files: u64,
    pub indexed_symbols: u64,
}

/// Seconds since the epoch, stamped into `schema_info.built_at` the first
/// time a store is created at a given path.
fn built_at_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Owns the project's deep store and shallow manager once a path has
/// been set, and dispatches the operations spec §6 names.
pub struct CodeIndexEngine {
    project_path: Option<PathBuf>,
    indexing_config: IndexingConfig,
    store_path: PathBuf,
    store: Option<DeepIndexStore>,
    shallow: Option<ShallowIndexManager>,
}

impl CodeIndexEngine {
    pub fn new(settings: &Settings) -> Self {
        Self {
            project_path: None,
            indexing_config: settings.indexing.clone(),
            store_path: settings.index_path.clone(),
            store: None,
            shallow: None,
        }
    }

    /// `false` if `path` doesn't resolve to a directory; both index
    /// managers are reset for the new project otherwise.
    pub fn set_project_path(&mut self, path: impl Into<PathBuf>, additional_excludes: Vec<String>) -> bool {
        let path = path.into();
        if !path.is_dir() {
            return false;
        }
        self.indexing_config.additional_excludes = additional_excludes;
        self.shallow = Some(ShallowIndexManager::new(&path));
        self.project_path = Some(path);
        self.store = None;
        true
    }

    /// Builds the store from scratch the first time it's called for a
    /// given `store_path`; on a later call against an already-built store
    /// it reparses only the files whose mtime or content changed.
    pub fn build_index(&mut self) -> IndexResult<bool> {
        let project_path = self.project_path.clone().ok_or(IndexError::NoProjectPath)?;

        let builder = IndexBuilder::new(&self.indexing_config);
        let existed = self.store_path.exists();
        let mut store = DeepIndexStore::open(&self.store_path, &project_path.to_string_lossy(), built_at_now())?;

        if existed {
            builder.build_incremental(&project_path, &mut store)?;
        } else {
            let built = builder.build(&project_path)?;
            store.replace_all(&built)?;
        }
        self.store = Some(store);

        if let Some(shallow) = self.shallow.as_mut() {
            shallow.build(&self.indexing_config)?;
        }

        Ok(true)
    }

    pub fn load_index(&mut self) -> IndexResult<bool> {
        let project_path = self.project_path.clone().ok_or(IndexError::NoProjectPath)?;
        self.store = Some(DeepIndexStore::open(&self.store_path, &project_path.to_string_lossy(), built_at_now())?);

        let shallow_loaded = match self.shallow.as_mut() {
            Some(shallow) => shallow.load()?,
            None => false,
        };
        Ok(shallow_loaded)
    }

    pub fn get_file_summary(&self, relative_path: &str) -> IndexResult<Option<FileSummary>> {
        let Some(store) = self.store.as_ref() else {
            return Ok(None);
        };
        let files = store.all_files()?;
        let Some((_, info)) = files.iter().find(|(path, _)| path == relative_path) else {
            return Ok(None);
        };

        let symbols = store.symbols_in_file(relative_path)?;
        let records = symbols
            .into_iter()
            .map(|(id, sym)| SymbolRecord {
                name: id.rsplit_once("::").map(|(_, q)| q.to_string()).unwrap_or(id),
                kind: sym.kind.as_str(),
                line: sym.line,
                signature: sym.signature,
                docstring: sym.docstring,
                called_by: sym.called_by,
            })
            .collect::<Vec<_>>();

        Ok(Some(FileSummary {
            language: info.language.clone(),
            symbol_count: records.len(),
            symbols: records,
        }))
    }

    pub fn get_index_stats(&self) -> IndexResult<IndexStats> {
        match self.store.as_ref() {
            Some(store) => Ok(IndexStats {
                status: "ready".to_string(),
                indexed_files: store.file_count()?,
                indexed_symbols: store.symbol_count()?,
            }),
            None => Ok(IndexStats {
                status: "not_built".to_string(),
                indexed_files: 0,
                indexed_symbols: 0,
            }),
        }
    }

    pub fn find_files(&self, pattern: &str) -> ValidationResult<FileSearchResult> {
        let Some(shallow) = self.shallow.as_ref() else {
            return Ok(FileSearchResult {
                files: Vec::new(),
                match_type: MatchType::NoMatch,
                original_pattern: pattern.to_string(),
                applied_pattern: pattern.to_string(),
            });
        };
        FileDiscoveryService::new(shallow).find_files(pattern, None)
    }

    pub fn get_file_list(&self) -> Vec<String> {
        self.shallow.as_ref().map(|s| s.file_list().to_vec()).unwrap_or_default()
    }

    pub fn search(
        &self,
        pattern: &str,
        start_index: usize,
        max_results: Option<usize>,
    ) -> IndexResult<(Vec<SearchRow>, PaginationInfo)> {
        let matches = self.search_matches(pattern)?;
        Ok(search::paginate(&matches, start_index, max_results))
    }

    /// Substring/regex search over every indexed file's contents, read
    /// fresh from disk (the store holds symbols, not file bodies).
    fn search_matches(&self, pattern: &str) -> IndexResult<HashMap<String, Vec<(u32, String)>>> {
        let project_path = self.project_path.as_ref().ok_or(IndexError::NoProjectPath)?;
        let regex = regex::Regex::new(pattern)
            .map_err(|e| ValidationError::new(format!("invalid search pattern: {e}")))?;

        let mut matches = HashMap::new();
        for path in self.get_file_list() {
            let Ok(content) = std::fs::read_to_string(project_path.join(&path)) else {
                continue;
            };
            let hits: Vec<(u32, String)> = content
                .lines()
                .enumerate()
                .filter(|(_, line)| regex.is_match(line))
                .map(|(i, line)| (i as u32 + 1, line.to_string()))
                .collect();
            if !hits.is_empty() {
                matches.insert(path, hits);
            }
        }
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn build_then_stats_reports_indexed_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.py"), "def f():\n    pass\n").unwrap();
        fs::write(dir.path().join("binary.index"), b"\x00binary-content").unwrap();

        let settings = Settings {
            index_path: dir.path().join("index.db"),
            ..Settings::default()
        };
        let mut engine = CodeIndexEngine::new(&settings);
        assert!(engine.set_project_path(dir.path(), Vec::new()));
        engine.build_index().unwrap();

        let stats = engine.get_index_stats().unwrap();
        assert_eq!(stats.indexed_files, 1);
    }

    #[test]
    fn rebuild_over_unchanged_tree_leaves_rows_untouched() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.py"), "def f():\n    pass\n").unwrap();

        let settings = Settings {
            index_path: dir.path().join("index.db"),
            ..Settings::default()
        };
        let mut engine = CodeIndexEngine::new(&settings);
        assert!(engine.set_project_path(dir.path(), Vec::new()));
        engine.build_index().unwrap();
        let before = engine.get_index_stats().unwrap();

        engine.build_index().unwrap();
        let after = engine.get_index_stats().unwrap();

        assert_eq!(before.indexed_files, after.indexed_files);
        assert_eq!(before.indexed_symbols, after.indexed_symbols);
    }

    #[test]
    fn rebuild_reparses_only_the_file_whose_mtime_changed() {
        let dir = TempDir::new().unwrap();
        let changed_path = dir.path().join("a.py");
        fs::write(&changed_path, "def one():\n    pass\n").unwrap();
        fs::write(dir.path().join("b.py"), "def two():\n    pass\n").unwrap();

        let settings = Settings {
            index_path: dir.path().join("index.db"),
            ..Settings::default()
        };
        let mut engine = CodeIndexEngine::new(&settings);
        assert!(engine.set_project_path(dir.path(), Vec::new()));
        engine.build_index().unwrap();

        fs::write(&changed_path, "def one():\n    pass\n\n\ndef extra():\n    pass\n").unwrap();
        let bumped = std::time::SystemTime::now() + std::time::Duration::from_secs(1);
        fs::File::options().write(true).open(&changed_path).unwrap().set_modified(bumped).unwrap();

        engine.build_index().unwrap();

        let stats = engine.get_index_stats().unwrap();
        assert_eq!(stats.indexed_files, 2);
        assert_eq!(stats.indexed_symbols, 3);

        let summary = engine.get_file_summary("b.py").unwrap().unwrap();
        assert_eq!(summary.symbol_count, 1);
    }

    #[test]
    fn exclusion_omits_matching_directory_at_any_depth() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.py"), "x = 1\n").unwrap();
        fs::create_dir_all(dir.path().join("custom_libs")).unwrap();
        fs::write(dir.path().join("custom_libs/lib.py"), "x = 1\n").unwrap();

        let settings = Settings {
            index_path: dir.path().join("index.db"),
            ..Settings::default()
        };
        let mut engine = CodeIndexEngine::new(&settings);
        assert!(engine.set_project_path(dir.path(), vec!["custom_libs".to_string()]));
        engine.build_index().unwrap();

        let stats = engine.get_index_stats().unwrap();
        assert_eq!(stats.indexed_files, 1);
    }

    #[test]
    fn get_file_summary_reports_symbols_and_callers() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.py"),
            "def helper():\n    pass\n\n\ndef caller():\n    helper()\n",
        )
        .unwrap();

        let settings = Settings {
            index_path: dir.path().join("index.db"),
            ..Settings::default()
        };
        let mut engine = CodeIndexEngine::new(&settings);
        engine.set_project_path(dir.path(), Vec::new());
        engine.build_index().unwrap();

        let summary = engine.get_file_summary("a.py").unwrap().unwrap();
        assert_eq!(summary.language, "python");
        assert_eq!(summary.symbol_count, 2);
        let helper = summary.symbols.iter().find(|s| s.name == "helper").unwrap();
        assert_eq!(helper.called_by, vec!["a.py::caller".to_string()]);
    }
}
