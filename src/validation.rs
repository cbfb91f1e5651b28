//! Input validation helpers (spec §4.7): pagination, patterns, and
//! project paths. Errors here are synchronous and never persisted.

use crate::error::{ValidationError, ValidationResult};
use std::path::Path;

/// `start_index` must be non-negative; `max_results`, if given, must be
/// positive. Returns the validated values as `usize` on success.
pub fn validate_pagination(
    start_index: i64,
    max_results: Option<i64>,
) -> ValidationResult<(usize, Option<usize>)> {
    if start_index < 0 {
        return Err(ValidationError::new(format!(
            "start_index must be a non-negative integer, got {start_index}"
        )));
    }
    let max_results = match max_results {
        Some(m) if m <= 0 => {
            return Err(ValidationError::new(format!(
                "max_results must be a positive integer, got {m}"
            )))
        }
        Some(m) => Some(m as usize),
        None => None,
    };
    Ok((start_index as usize, max_results))
}

/// A pattern must be non-empty after trimming.
pub fn validate_pattern(pattern: &str) -> ValidationResult<&str> {
    let trimmed = pattern.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("pattern must not be empty"));
    }
    Ok(trimmed)
}

/// A project path must exist and be a directory.
pub fn validate_project_path(path: &Path) -> ValidationResult<()> {
    if !path.is_dir() {
        return Err(ValidationError::new(format!(
            "project path does not exist or is not a directory: {}",
            path.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_start_index_is_rejected() {
        assert!(validate_pagination(-1, None).is_err());
    }

    #[test]
    fn zero_or_negative_max_results_is_rejected() {
        assert!(validate_pagination(0, Some(0)).is_err());
        assert!(validate_pagination(0, Some(-5)).is_err());
    }

    #[test]
    fn valid_pagination_passes_through() {
        assert_eq!(validate_pagination(3, Some(10)).unwrap(), (3, Some(10)));
        assert_eq!(validate_pagination(0, None).unwrap(), (0, None));
    }

    #[test]
    fn empty_or_whitespace_pattern_is_rejected() {
        assert!(validate_pattern("").is_err());
        assert!(validate_pattern("   ").is_err());
        assert_eq!(validate_pattern("  foo  ").unwrap(), "foo");
    }

    #[test]
    fn nonexistent_project_path_is_rejected() {
        assert!(validate_project_path(Path::new("/no/such/path/at/all")).is_err());
    }
}
