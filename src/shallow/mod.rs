//! Shallow index manager (spec §4.4): a flat, persisted file-path list
//! plus lenient glob matching with explicit match-quality reporting.

use crate::config::{IndexingConfig, Settings};
use crate::error::{IndexError, IndexResult};
use crate::indexing::FileWalker;
use crate::symbol::FileSearchResult;
use crate::types::{normalize_path, MatchType};
use regex::Regex;
use std::path::PathBuf;

const SHALLOW_INDEX_FILE: &str = "shallow_index.json";

pub struct ShallowIndexManager {
    project_path: PathBuf,
    store_path: PathBuf,
    files: Vec<String>,
}

impl ShallowIndexManager {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        let project_path = project_path.into();
        let store_path = Settings::temp_dir_for(&project_path).join(SHALLOW_INDEX_FILE);
        Self {
            project_path,
            store_path,
            files: Vec::new(),
        }
    }

    /// Walk the project using the same directory-exclusion rules as the
    /// deep build (but no binary/size rejection — this index only ever
    /// lists paths) and persist the result.
    pub fn build(&mut self, config: &IndexingConfig) -> IndexResult<()> {
        let walker = FileWalker::new(config);
        self.files = walker
            .walk_all_paths(&self.project_path)
            .map(|path| {
                let relative = path.strip_prefix(&self.project_path).unwrap_or(&path);
                normalize_path(&relative.to_string_lossy())
            })
            .collect();
        self.persist()
    }

    fn persist(&self) -> IndexResult<()> {
        if let Some(parent) = self.store_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| IndexError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string(&self.files).expect("Vec<String> always serializes");
        std::fs::write(&self.store_path, json).map_err(|source| IndexError::FileWrite {
            path: self.store_path.clone(),
            source,
        })
    }

    /// Load the persisted file list, normalizing defensively on ingress.
    /// Returns `false` if nothing has been persisted yet.
    pub fn load(&mut self) -> IndexResult<bool> {
        let content = match std::fs::read_to_string(&self.store_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(source) => {
                return Err(IndexError::FileRead {
                    path: self.store_path.clone(),
                    source,
                })
            }
        };
        let raw: Vec<String> = serde_json::from_str(&content).unwrap_or_default();
        self.files = raw.iter().map(|p| normalize_path(p)).collect();
        Ok(true)
    }

    pub fn file_list(&self) -> &[String] {
        &self.files
    }

    pub fn project_path(&self) -> &std::path::Path {
        &self.project_path
    }

    /// The lenient, multi-stage glob match (spec §4.4): exact, then
    /// recursive, then case-insensitive root, then case-insensitive
    /// recursive, stopping at the first nonempty result.
    pub fn find_files(&self, pattern: &str) -> FileSearchResult {
        let original = pattern.to_string();
        let normalized = normalize_path(pattern.trim());

        if normalized.is_empty() || normalized == "*" {
            return FileSearchResult {
                files: self.files.clone(),
                match_type: MatchType::All,
                original_pattern: original,
                applied_pattern: normalized,
            };
        }

        if let Some(files) = self.match_against(&normalized, false) {
            return FileSearchResult {
                files,
                match_type: MatchType::Exact,
                original_pattern: original,
                applied_pattern: normalized,
            };
        }

        if !normalized.contains('/') {
            let recursive = format!("**/{normalized}");
            if let Some(files) = self.match_against(&recursive, false) {
                return FileSearchResult {
                    files,
                    match_type: MatchType::Recursive,
                    original_pattern: original,
                    applied_pattern: recursive,
                };
            }
        }

        if let Some(files) = self.match_against(&normalized, true) {
            return FileSearchResult {
                files,
                match_type: MatchType::CaseInsensitiveRoot,
                original_pattern: original,
                applied_pattern: normalized,
            };
        }

        let recursive = format!("**/{normalized}");
        if let Some(files) = self.match_against(&recursive, true) {
            return FileSearchResult {
                files,
                match_type: MatchType::CaseInsensitiveRecursive,
                original_pattern: original,
                applied_pattern: recursive,
            };
        }

        FileSearchResult {
            files: Vec::new(),
            match_type: MatchType::NoMatch,
            original_pattern: original,
            applied_pattern: normalized,
        }
    }

    fn match_against(&self, glob_pattern: &str, case_insensitive: bool) -> Option<Vec<String>> {
        let regex = compile_glob(glob_pattern, case_insensitive)?;
        let matches: Vec<String> = self.files.iter().filter(|f| regex.is_match(f)).cloned().collect();
        if matches.is_empty() {
            None
        } else {
            Some(matches)
        }
    }
}

/// Translate a lenient glob into an anchored regex: `**` crosses `/`,
/// `*` stays within a path segment, `?` matches one non-separator
/// character, everything else is literal.
fn compile_glob(pattern: &str, case_insensitive: bool) -> Option<Regex> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut body = String::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                body.push_str(".*");
                i += 2;
            }
            '*' => {
                body.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                body.push_str("[^/]");
                i += 1;
            }
            c => {
                body.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }
    let pattern = if case_insensitive {
        format!("(?i)^{body}$")
    } else {
        format!("^{body}$")
    };
    Regex::new(&pattern).ok()
}
