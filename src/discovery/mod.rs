//! File-discovery service (spec §4.5): validation + pagination layer on
//! top of the shallow index.

use crate::error::ValidationResult;
use crate::shallow::ShallowIndexManager;
use crate::symbol::FileSearchResult;
use crate::validation::{validate_pattern, validate_project_path};

pub struct FileDiscoveryService<'a> {
    shallow: &'a ShallowIndexManager,
}

impl<'a> FileDiscoveryService<'a> {
    pub fn new(shallow: &'a ShallowIndexManager) -> Self {
        Self { shallow }
    }

    /// Validate the project is initialized and the pattern is non-empty
    /// after trimming, delegate to the shallow manager, then truncate
    /// `files` to `max_results` (if a positive limit was given) while
    /// preserving `match_type`.
    pub fn find_files(&self, pattern: &str, max_results: Option<usize>) -> ValidationResult<FileSearchResult> {
        validate_project_path(self.shallow.project_path())?;
        let pattern = validate_pattern(pattern)?;

        let mut result = self.shallow.find_files(pattern);
        if let Some(limit) = max_results.filter(|&limit| limit > 0) {
            result.files.truncate(limit);
        }
        Ok(result)
    }

    pub fn file_list(&self) -> ValidationResult<Vec<String>> {
        validate_project_path(self.shallow.project_path())?;
        Ok(self.shallow.file_list().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn truncates_files_to_max_results_preserving_match_type() {
        let dir = TempDir::new().unwrap();
        for name in ["a.py", "b.py", "c.py"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        let mut shallow = ShallowIndexManager::new(dir.path());
        shallow.build(&crate::config::Settings::default().indexing).unwrap();

        let service = FileDiscoveryService::new(&shallow);
        let result = service.find_files("*", Some(2)).unwrap();
        assert_eq!(result.files.len(), 2);
        assert_eq!(result.match_type, crate::types::MatchType::All);
    }

    #[test]
    fn empty_pattern_is_rejected() {
        let dir = TempDir::new().unwrap();
        let shallow = ShallowIndexManager::new(dir.path());
        let service = FileDiscoveryService::new(&shallow);
        assert!(service.find_files("   ", None).is_err());
    }

    #[test]
    fn uninitialized_project_is_rejected() {
        let shallow = ShallowIndexManager::new("/no/such/project/path");
        let service = FileDiscoveryService::new(&shallow);
        assert!(service.find_files("*", None).is_err());
    }
}
