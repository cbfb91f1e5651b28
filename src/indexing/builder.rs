//! Deep index builder (spec §4.2): walks a project, dispatches each file
//! to its parsing strategy (optionally in parallel), then runs a single
//! cross-file call-resolution pass before the result is persisted.

use crate::config::IndexingConfig;
use crate::error::{IndexError, IndexResult};
use crate::indexing::walker::{DiscoveredFile, FileWalker};
use crate::parsing::call_resolution::GlobalNameIndex;
use crate::parsing::{unknown_file_info, StrategyRegistry};
use crate::storage::DeepIndexStore;
use crate::symbol::{FileInfo, SymbolInfo, SymbolTable};
use crate::types::normalize_path;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

struct ParsedFile {
    relative_path: String,
    info: FileInfo,
    symbols: SymbolTable,
    mtime: i64,
    content_hash: String,
}

/// Deep-index contents assembled in memory, ready to hand to
/// [`crate::storage::DeepIndexStore::replace_all`].
#[derive(Debug, Default)]
pub struct BuiltIndex {
    pub files: BTreeMap<String, FileInfo>,
    pub symbols: BTreeMap<String, SymbolInfo>,
    /// path → (mtime, content_hash), kept alongside `files` rather than
    /// folded into `FileInfo` since it's filesystem bookkeeping, not part
    /// of the data model a query returns.
    pub file_meta: BTreeMap<String, (i64, String)>,
}

/// Hex-encoded SHA-256 of `content`, used to tell a real edit apart from
/// a touch that only bumped mtime.
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

pub struct IndexBuilder {
    registry: StrategyRegistry,
    walker: FileWalker,
    parallel: bool,
}

impl IndexBuilder {
    pub fn new(config: &IndexingConfig) -> Self {
        Self {
            registry: StrategyRegistry::standard(),
            walker: FileWalker::new(config),
            parallel: config.parallel,
        }
    }

    /// Walk `root`, parse every discovered file, resolve cross-file calls,
    /// and return the assembled index. A file that fails to read or parse
    /// is dropped from the result rather than failing the whole build.
    pub fn build(&self, root: &Path) -> IndexResult<BuiltIndex> {
        if !root.is_dir() {
            return Err(IndexError::InvalidProjectPath { path: root.to_path_buf() });
        }

        let discovered: Vec<DiscoveredFile> = self.walker.walk(root).collect();

        let parse_one = |file: &DiscoveredFile| -> Option<ParsedFile> { self.parse(root, file) };

        let parsed: Vec<ParsedFile> = if self.parallel {
            discovered.par_iter().filter_map(parse_one).collect()
        } else {
            discovered.iter().filter_map(parse_one).collect()
        };

        Ok(assemble(parsed))
    }

    fn parse(&self, root: &Path, file: &DiscoveredFile) -> Option<ParsedFile> {
        let content = std::fs::read_to_string(&file.path).ok()?;
        let relative_path = normalize_path(
            &file
                .path
                .strip_prefix(root)
                .unwrap_or(&file.path)
                .to_string_lossy(),
        );
        let (symbols, info) = match self.registry.for_path(&file.path) {
            Some(strategy) => strategy.parse_file(&relative_path, &content),
            None => (SymbolTable::new(), unknown_file_info(&content)),
        };
        let content_hash = hash_content(&content);
        Some(ParsedFile { relative_path, info, symbols, mtime: file.mtime, content_hash })
    }

    /// Reparse only the files whose mtime (and, on a touch, content hash)
    /// changed since the last build, add newly discovered files, and drop
    /// rows for files no longer present. Returns `false` without touching
    /// `store` at all when nothing changed: re-running a build over an
    /// untouched tree is a no-op at the row level.
    pub fn build_incremental(&self, root: &Path, store: &mut DeepIndexStore) -> IndexResult<bool> {
        if !root.is_dir() {
            return Err(IndexError::InvalidProjectPath { path: root.to_path_buf() });
        }

        let candidates: Vec<(String, PathBuf, i64)> = self
            .walker
            .walk(root)
            .map(|file| {
                let relative_path = normalize_path(
                    &file.path.strip_prefix(root).unwrap_or(&file.path).to_string_lossy(),
                );
                (relative_path, file.path, file.mtime)
            })
            .collect();

        let stored: HashMap<String, (i64, String)> = store
            .all_file_stamps()?
            .into_iter()
            .map(|(path, mtime, hash)| (path, (mtime, hash)))
            .collect();

        let discovered_paths: HashSet<&str> = candidates.iter().map(|(p, ..)| p.as_str()).collect();
        let removed: Vec<String> =
            stored.keys().filter(|p| !discovered_paths.contains(p.as_str())).cloned().collect();

        let mut changed: Vec<ParsedFile> = Vec::new();
        for (relative_path, path, mtime) in &candidates {
            if let Some((stored_mtime, _)) = stored.get(relative_path) {
                if stored_mtime == mtime {
                    continue;
                }
            }
            let Ok(content) = std::fs::read_to_string(path) else { continue };
            let content_hash = hash_content(&content);
            if let Some((_, stored_hash)) = stored.get(relative_path) {
                if stored_hash == &content_hash {
                    continue; // touched, not edited: no row change needed
                }
            }
            let (symbols, info) = match self.registry.for_path(path) {
                Some(strategy) => strategy.parse_file(relative_path, &content),
                None => (SymbolTable::new(), unknown_file_info(&content)),
            };
            changed.push(ParsedFile {
                relative_path: relative_path.clone(),
                info,
                symbols,
                mtime: *mtime,
                content_hash,
            });
        }

        if removed.is_empty() && changed.is_empty() {
            return Ok(false);
        }

        for path in &removed {
            store.remove_file(path)?;
        }

        let changed_paths: HashSet<&str> = changed.iter().map(|p| p.relative_path.as_str()).collect();
        let retained_ids: Vec<String> = store
            .all_symbol_ids()?
            .into_iter()
            .filter(|id| !id_is_in_files(id, &changed_paths))
            .collect();

        let mut name_index = GlobalNameIndex::new();
        for id in &retained_ids {
            name_index.insert(id);
        }
        let mut batch_symbols: BTreeMap<String, SymbolInfo> = BTreeMap::new();
        let mut pending: Vec<(String, String)> = Vec::new();
        for parsed_file in &changed {
            for id in parsed_file.symbols.keys() {
                name_index.insert(id);
            }
            pending.extend(parsed_file.info.pending_calls.iter().cloned());
            batch_symbols.extend(parsed_file.symbols.clone());
        }

        for (caller_id, callee_name) in pending {
            let Some(callee_id) = name_index.resolve(&callee_name) else { continue };
            if let Some(callee) = batch_symbols.get_mut(callee_id) {
                callee.add_caller(&caller_id);
            } else {
                store.add_caller(callee_id, &caller_id)?;
            }
        }

        for parsed_file in changed {
            let prefix = format!("{}::", parsed_file.relative_path);
            let file_symbols: SymbolTable = batch_symbols
                .iter()
                .filter(|(id, _)| id.starts_with(&prefix))
                .map(|(id, s)| (id.clone(), s.clone()))
                .collect();
            store.replace_file(
                &parsed_file.relative_path,
                &parsed_file.info,
                &file_symbols,
                parsed_file.mtime,
                &parsed_file.content_hash,
            )?;
        }

        Ok(true)
    }
}

fn id_is_in_files(symbol_id: &str, paths: &HashSet<&str>) -> bool {
    symbol_id.rsplit_once("::").is_some_and(|(file, _)| paths.contains(file))
}

/// Merge parsed files into a single index and resolve `pending_calls`
/// against a global simple-name index, per the tie-break rules in
/// [`GlobalNameIndex::resolve`].
fn assemble(parsed: Vec<ParsedFile>) -> BuiltIndex {
    let mut files = BTreeMap::new();
    let mut symbols = BTreeMap::new();
    let mut file_meta = BTreeMap::new();
    let mut name_index = GlobalNameIndex::new();
    let mut pending: Vec<(String, String)> = Vec::new();

    for parsed_file in parsed {
        for id in parsed_file.symbols.keys() {
            name_index.insert(id);
        }
        pending.extend(parsed_file.info.pending_calls.iter().cloned());
        symbols.extend(parsed_file.symbols);
        file_meta.insert(parsed_file.relative_path.clone(), (parsed_file.mtime, parsed_file.content_hash));
        files.insert(parsed_file.relative_path, parsed_file.info);
    }

    for (caller_id, callee_name) in pending {
        if let Some(callee_id) = name_index.resolve(&callee_name) {
            if let Some(callee) = symbols.get_mut(callee_id) {
                callee.add_caller(&caller_id);
            }
        }
    }

    BuiltIndex { files, symbols, file_meta }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config() -> IndexingConfig {
        crate::config::Settings::default().indexing
    }

    #[test]
    fn builds_index_across_multiple_languages() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.py"),
            "def helper():\n    pass\n\n\ndef caller():\n    helper()\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("b.go"),
            "package main\n\nfunc Main() {\n\tfmt.Println(\"hi\")\n}\n",
        )
        .unwrap();

        let builder = IndexBuilder::new(&config());
        let index = builder.build(dir.path()).unwrap();

        assert_eq!(index.files.len(), 2);
        assert!(index.files.contains_key("a.py"));
        assert!(index.files.contains_key("b.go"));
        assert!(index.symbols.contains_key("a.py::helper"));
        assert!(index.symbols.contains_key("a.py::caller"));
    }

    #[test]
    fn resolves_pending_call_across_functions_in_same_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.py"),
            "def helper():\n    pass\n\n\ndef caller():\n    helper()\n",
        )
        .unwrap();

        let builder = IndexBuilder::new(&config());
        let index = builder.build(dir.path()).unwrap();

        let helper = index.symbols.get("a.py::helper").unwrap();
        assert_eq!(helper.called_by, vec!["a.py::caller".to_string()]);
    }

    #[test]
    fn missing_root_is_invalid_project_path_error() {
        let builder = IndexBuilder::new(&config());
        let result = builder.build(Path::new("/no/such/directory/at/all"));
        assert!(matches!(result, Err(IndexError::InvalidProjectPath { .. })));
    }

    #[test]
    fn sequential_mode_matches_parallel_mode() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "def f():\n    pass\n").unwrap();

        let mut config = config();
        config.parallel = false;
        let builder = IndexBuilder::new(&config);
        let index = builder.build(dir.path()).unwrap();

        assert!(index.symbols.contains_key("a.py::f"));
    }

    #[test]
    fn incremental_rebuild_over_unchanged_tree_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.py"), "def f():\n    pass\n").unwrap();

        let builder = IndexBuilder::new(&config());
        let mut store = DeepIndexStore::open_in_memory("/proj", 0).unwrap();
        store.replace_all(&builder.build(dir.path()).unwrap()).unwrap();

        let changed = builder.build_incremental(dir.path(), &mut store).unwrap();
        assert!(!changed);
        assert_eq!(store.symbol_count().unwrap(), 1);
    }

    #[test]
    fn incremental_rebuild_adds_new_file_and_removes_deleted_one() {
        let dir = TempDir::new().unwrap();
        let gone_path = dir.path().join("gone.py");
        fs::write(&gone_path, "def gone():\n    pass\n").unwrap();

        let builder = IndexBuilder::new(&config());
        let mut store = DeepIndexStore::open_in_memory("/proj", 0).unwrap();
        store.replace_all(&builder.build(dir.path()).unwrap()).unwrap();

        fs::remove_file(&gone_path).unwrap();
        fs::write(dir.path().join("new.py"), "def fresh():\n    pass\n").unwrap();

        let changed = builder.build_incremental(dir.path(), &mut store).unwrap();
        assert!(changed);
        assert!(store.symbol("new.py::fresh").unwrap().is_some());
        assert!(store.symbol("gone.py::gone").unwrap().is_none());
    }

    #[test]
    fn incremental_rebuild_resolves_new_caller_into_an_unchanged_file() {
        let dir = TempDir::new().unwrap();
        let caller_path = dir.path().join("caller.py");
        fs::write(dir.path().join("callee.py"), "def target():\n    pass\n").unwrap();
        fs::write(&caller_path, "x = 1\n").unwrap();

        let builder = IndexBuilder::new(&config());
        let mut store = DeepIndexStore::open_in_memory("/proj", 0).unwrap();
        store.replace_all(&builder.build(dir.path()).unwrap()).unwrap();

        fs::write(&caller_path, "def caller():\n    target()\n").unwrap();
        let bumped = std::time::SystemTime::now() + std::time::Duration::from_secs(1);
        fs::File::options().write(true).open(&caller_path).unwrap().set_modified(bumped).unwrap();

        builder.build_incremental(dir.path(), &mut store).unwrap();

        let target = store.symbol("callee.py::target").unwrap().unwrap();
        assert_eq!(target.called_by, vec!["caller.py::caller".to_string()]);
    }
}
