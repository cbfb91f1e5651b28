//! File discovery for the deep index (spec §4.2): a directory walk that
//! excludes a fixed set of directory basenames at every nesting level
//! (not `.gitignore`-driven — a project's own ignore rules say nothing
//! about what should be searchable) and skips files that are binary or
//! too large to be worth parsing.

use crate::config::IndexingConfig;
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Why a candidate file was not handed to a parsing strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Binary,
    TooLarge,
}

pub struct DiscoveredFile {
    pub path: PathBuf,
    pub size: u64,
    /// Milliseconds since the epoch, used by the incremental builder to
    /// decide whether a file needs reparsing.
    pub mtime: i64,
}

pub struct FileWalker {
    excludes: HashSet<String>,
    max_file_size_bytes: u64,
}

impl FileWalker {
    pub fn new(config: &IndexingConfig) -> Self {
        let excludes = config
            .default_excludes
            .iter()
            .chain(config.additional_excludes.iter())
            .cloned()
            .collect();
        Self {
            excludes,
            max_file_size_bytes: config.max_file_size_bytes,
        }
    }

    /// Walk `root`, yielding every regular file not inside an excluded
    /// directory. Binary and oversize files are deliberately filtered
    /// out here too, via [`Self::classify`], so only candidates worth
    /// parsing reach the caller.
    pub fn walk(&self, root: &Path) -> impl Iterator<Item = DiscoveredFile> + '_ {
        self.raw_entries(root).filter_map(move |(path, size, mtime)| {
            if self.classify(&path, size).is_some() {
                return None;
            }
            Some(DiscoveredFile { path, size, mtime })
        })
    }

    /// Every file under `root` surviving directory exclusion, regardless
    /// of binary/size status. The shallow index only lists paths and
    /// never reads content, so binary-rejection doesn't apply to it.
    pub fn walk_all_paths(&self, root: &Path) -> impl Iterator<Item = PathBuf> + '_ {
        self.raw_entries(root).map(|(path, ..)| path)
    }

    fn raw_entries(&self, root: &Path) -> impl Iterator<Item = (PathBuf, u64, i64)> + '_ {
        let excludes = self.excludes.clone();
        WalkBuilder::new(root)
            .standard_filters(false)
            .hidden(false)
            .follow_links(false)
            .filter_entry(move |entry| {
                if entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    entry
                        .file_name()
                        .to_str()
                        .is_none_or(|name| !excludes.contains(name))
                } else {
                    true
                }
            })
            .build()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .filter_map(|entry| {
                let metadata = entry.metadata().ok()?;
                let len = metadata.len();
                let mtime = file_mtime_millis(&metadata);
                Some((entry.into_path(), len, mtime))
            })
    }

    /// Decide whether a file should be skipped, and why. `None` means
    /// the file is a normal parsing candidate.
    pub fn classify(&self, path: &Path, size: u64) -> Option<SkipReason> {
        if size > self.max_file_size_bytes {
            return Some(SkipReason::TooLarge);
        }
        if is_binary(path) {
            return Some(SkipReason::Binary);
        }
        None
    }
}

/// Milliseconds since the epoch, so that quick successive writes in tests
/// and watch-driven rebuilds still produce a detectable change.
fn file_mtime_millis(metadata: &std::fs::Metadata) -> i64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// A file is treated as binary if a NUL byte appears in its first 1KB,
/// the same heuristic `git` and most text editors use.
fn is_binary(path: &Path) -> bool {
    use std::io::Read;
    let Ok(mut file) = std::fs::File::open(path) else {
        return true;
    };
    let mut buf = [0u8; 1024];
    let Ok(n) = file.read(&mut buf) else {
        return true;
    };
    buf[..n].contains(&0)
}
