//! Search pagination helper (spec §4.6): deterministic ordering and
//! windowing of raw substring/regex match rows.

use crate::symbol::PaginationInfo;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRow {
    pub path: String,
    pub line: u32,
    pub text: String,
}

/// Flatten `{path → [(line, text)]}` into rows ordered by `(path, line)`,
/// then window by `[start_index, start_index + max_results)`.
/// `max_results = None` means no limit. When `start_index` is at or past
/// the total, the window is empty and `end_index == total_matches`.
pub fn paginate(
    matches: &HashMap<String, Vec<(u32, String)>>,
    start_index: usize,
    max_results: Option<usize>,
) -> (Vec<SearchRow>, PaginationInfo) {
    let mut rows: Vec<SearchRow> = matches
        .iter()
        .flat_map(|(path, hits)| {
            hits.iter().map(move |(line, text)| SearchRow {
                path: path.clone(),
                line: *line,
                text: text.clone(),
            })
        })
        .collect();
    rows.sort_by(|a, b| a.path.cmp(&b.path).then(a.line.cmp(&b.line)));

    let total_matches = rows.len();
    let start = start_index.min(total_matches);
    let end = match max_results {
        Some(limit) => start.saturating_add(limit).min(total_matches),
        None => total_matches,
    };

    let windowed = rows[start..end].to_vec();
    let pagination = PaginationInfo {
        total_matches,
        returned: windowed.len(),
        start_index: start,
        end_index: end,
        has_more: end < total_matches,
        max_results,
    };

    (windowed, pagination)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HashMap<String, Vec<(u32, String)>> {
        HashMap::from([
            ("b/file.py".to_string(), vec![(12, "second".to_string()), (3, "first".to_string())]),
            ("a/file.py".to_string(), vec![(8, "other".to_string())]),
        ])
    }

    #[test]
    fn rows_are_ordered_by_path_then_line() {
        let (rows, info) = paginate(&sample(), 0, None);
        let locations: Vec<(&str, u32)> = rows.iter().map(|r| (r.path.as_str(), r.line)).collect();
        assert_eq!(locations, vec![("a/file.py", 8), ("b/file.py", 3), ("b/file.py", 12)]);
        assert_eq!(info.total_matches, 3);
        assert!(!info.has_more);
    }

    #[test]
    fn max_results_windows_and_reports_has_more() {
        let (rows, info) = paginate(&sample(), 0, Some(2));
        assert_eq!(rows.len(), 2);
        assert_eq!(info.end_index, 2);
        assert!(info.has_more);
    }

    #[test]
    fn start_past_total_clips_to_total_with_empty_rows() {
        let (rows, info) = paginate(&sample(), 100, None);
        assert!(rows.is_empty());
        assert_eq!(info.start_index, 3);
        assert_eq!(info.end_index, 3);
        assert!(!info.has_more);
    }
}
