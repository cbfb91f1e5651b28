//! Integration tests exercising the engine end-to-end against real
//! temporary project trees, covering the concrete scenarios and a few
//! of the round-trip/idempotence laws.

use codeindex::config::Settings;
use codeindex::engine::CodeIndexEngine;
use std::fs;
use tempfile::TempDir;

fn settings_for(dir: &TempDir) -> Settings {
    Settings {
        index_path: dir.path().join(".code-index").join("index.db"),
        ..Settings::default()
    }
}

#[test]
fn shallow_lenient_recursive_fallback() {
    let project = TempDir::new().unwrap();
    fs::create_dir_all(project.path().join("src")).unwrap();
    fs::create_dir_all(project.path().join("test")).unwrap();
    fs::write(project.path().join("src/users.go"), "package main\n").unwrap();
    fs::write(project.path().join("test/users_test.go"), "package main\n").unwrap();

    let store_dir = TempDir::new().unwrap();
    let settings = settings_for(&store_dir);
    let mut engine = CodeIndexEngine::new(&settings);
    assert!(engine.set_project_path(project.path(), Vec::new()));
    engine.build_index().unwrap();

    let result = engine.find_files("users.go").unwrap();
    assert_eq!(result.files, vec!["src/users.go".to_string()]);
    assert_eq!(result.match_type, codeindex::MatchType::Recursive);
}

#[test]
fn shallow_case_insensitive_is_last_resort() {
    let project = TempDir::new().unwrap();
    fs::create_dir_all(project.path().join("src/models")).unwrap();
    fs::write(project.path().join("src/models/user.go"), "package main\n").unwrap();

    let store_dir = TempDir::new().unwrap();
    let settings = settings_for(&store_dir);
    let mut engine = CodeIndexEngine::new(&settings);
    engine.set_project_path(project.path(), Vec::new());
    engine.build_index().unwrap();

    let result = engine.find_files("USER.GO").unwrap();
    assert_eq!(result.files, vec!["src/models/user.go".to_string()]);
    assert_eq!(result.match_type, codeindex::MatchType::CaseInsensitiveRecursive);
}

#[test]
fn binary_file_is_skipped_from_deep_index() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("main.py"), "def f():\n    pass\n").unwrap();
    fs::write(project.path().join("binary.index"), b"\x00binary-content").unwrap();

    let store_dir = TempDir::new().unwrap();
    let settings = settings_for(&store_dir);
    let mut engine = CodeIndexEngine::new(&settings);
    engine.set_project_path(project.path(), Vec::new());
    engine.build_index().unwrap();

    let stats = engine.get_index_stats().unwrap();
    assert_eq!(stats.indexed_files, 1);
}

#[test]
fn excluded_directory_is_omitted_at_any_depth() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("main.py"), "x = 1\n").unwrap();
    fs::create_dir_all(project.path().join("custom_libs")).unwrap();
    fs::write(project.path().join("custom_libs/lib.py"), "x = 1\n").unwrap();

    let store_dir = TempDir::new().unwrap();
    let settings = settings_for(&store_dir);
    let mut engine = CodeIndexEngine::new(&settings);
    engine.set_project_path(project.path(), vec!["custom_libs".to_string()]);
    engine.build_index().unwrap();

    let stats = engine.get_index_stats().unwrap();
    assert_eq!(stats.indexed_files, 1);
}

#[test]
fn go_function_parses_signature_and_docstring() {
    let project = TempDir::new().unwrap();
    fs::write(
        project.path().join("test.go"),
        "package main\n\n// Add returns the sum of two integers.\nfunc Add(x int, y int) int {\n\treturn x + y\n}\n",
    )
    .unwrap();

    let store_dir = TempDir::new().unwrap();
    let settings = settings_for(&store_dir);
    let mut engine = CodeIndexEngine::new(&settings);
    engine.set_project_path(project.path(), Vec::new());
    engine.build_index().unwrap();

    let summary = engine.get_file_summary("test.go").unwrap().unwrap();
    let add = summary.symbols.iter().find(|s| s.name == "Add").unwrap();
    assert_eq!(add.kind, "function");
    assert!(add.signature.as_deref().unwrap().contains("Add"));
    assert!(add.signature.as_deref().unwrap().contains("int"));
    assert_eq!(add.docstring.as_deref(), Some("Add returns the sum of two integers."));
}

#[test]
fn search_rows_are_paginated_in_path_then_line_order() {
    let project = TempDir::new().unwrap();
    fs::create_dir_all(project.path().join("a")).unwrap();
    fs::create_dir_all(project.path().join("b")).unwrap();
    fs::write(project.path().join("a/file.py"), "other\n").unwrap();
    fs::write(project.path().join("b/file.py"), "first\nx\nsecond\n").unwrap();

    let store_dir = TempDir::new().unwrap();
    let settings = settings_for(&store_dir);
    let mut engine = CodeIndexEngine::new(&settings);
    engine.set_project_path(project.path(), Vec::new());
    engine.build_index().unwrap();

    let (rows, pagination) = engine.search("(first|second|other)", 0, None).unwrap();
    let locations: Vec<(&str, u32)> = rows.iter().map(|r| (r.path.as_str(), r.line)).collect();
    assert_eq!(
        locations,
        vec![("a/file.py", 1), ("b/file.py", 1), ("b/file.py", 3)]
    );
    assert_eq!(pagination.total_matches, 3);
    assert!(!pagination.has_more);
}

#[test]
fn build_then_load_is_idempotent_on_unchanged_inputs() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("a.py"), "def f():\n    pass\n").unwrap();

    let store_dir = TempDir::new().unwrap();
    let settings = settings_for(&store_dir);

    let mut builder_engine = CodeIndexEngine::new(&settings);
    builder_engine.set_project_path(project.path(), Vec::new());
    builder_engine.build_index().unwrap();
    let built_stats = builder_engine.get_index_stats().unwrap();

    let mut loader_engine = CodeIndexEngine::new(&settings);
    loader_engine.set_project_path(project.path(), Vec::new());
    loader_engine.load_index().unwrap();
    let loaded_stats = loader_engine.get_index_stats().unwrap();

    assert_eq!(built_stats.indexed_files, loaded_stats.indexed_files);
    assert_eq!(built_stats.indexed_symbols, loaded_stats.indexed_symbols);
}

#[test]
fn rebuild_after_editing_one_file_updates_only_that_files_symbols() {
    let project = TempDir::new().unwrap();
    let edited = project.path().join("a.py");
    fs::write(&edited, "def one():\n    pass\n").unwrap();
    fs::write(project.path().join("b.py"), "def two():\n    pass\n").unwrap();

    let store_dir = TempDir::new().unwrap();
    let settings = settings_for(&store_dir);
    let mut engine = CodeIndexEngine::new(&settings);
    engine.set_project_path(project.path(), Vec::new());
    engine.build_index().unwrap();

    fs::write(&edited, "def one():\n    pass\n\n\ndef two_more():\n    pass\n").unwrap();
    let bumped = std::time::SystemTime::now() + std::time::Duration::from_secs(1);
    fs::File::options().write(true).open(&edited).unwrap().set_modified(bumped).unwrap();
    engine.build_index().unwrap();

    let stats = engine.get_index_stats().unwrap();
    assert_eq!(stats.indexed_files, 2);
    assert_eq!(stats.indexed_symbols, 3);

    let summary = engine.get_file_summary("b.py").unwrap().unwrap();
    assert_eq!(summary.symbol_count, 1);
}

#[test]
fn cross_file_call_is_resolved_into_called_by() {
    let project = TempDir::new().unwrap();
    fs::write(
        project.path().join("helper.py"),
        "def helper():\n    pass\n",
    )
    .unwrap();
    fs::write(
        project.path().join("main.py"),
        "def run():\n    helper()\n",
    )
    .unwrap();

    let store_dir = TempDir::new().unwrap();
    let settings = settings_for(&store_dir);
    let mut engine = CodeIndexEngine::new(&settings);
    engine.set_project_path(project.path(), Vec::new());
    engine.build_index().unwrap();

    let summary = engine.get_file_summary("helper.py").unwrap().unwrap();
    let helper = summary.symbols.iter().find(|s| s.name == "helper").unwrap();
    assert_eq!(helper.called_by, vec!["main.py::run".to_string()]);
}
