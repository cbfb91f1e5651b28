//! Go parsing strategy (spec §4.1): regex/line-based, no tree-sitter
//! grammar. Mirrors Go's own convention that documentation is just the
//! comment block immediately preceding a declaration, with no blank
//! line in between.

use super::ParsingStrategy;
use crate::symbol::{FileInfo, SymbolInfo, SymbolTable};
use crate::types::{symbol_id, SymbolKind};
use regex::Regex;
use std::sync::OnceLock;

fn package_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^package\s+(\S+)").unwrap())
}

fn single_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"import\s+"([^"]+)""#).unwrap())
}

fn quoted_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""([^"]+)""#).unwrap())
}

fn func_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^func\s+(\w+)\s*\(").unwrap())
}

fn method_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^func\s+\([^)]+\)\s+(\w+)\s*\(").unwrap())
}

fn func_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^func\s+(?:\([^)]*\)\s+)?(\w+)\s*\(").unwrap())
}

fn struct_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^type\s+(\w+)\s+struct\s*\{").unwrap())
}

fn interface_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^type\s+(\w+)\s+interface\s*\{").unwrap())
}

fn call_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\w+)\s*\(").unwrap())
}

fn call_method_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.(\w+)\s*\(").unwrap())
}

pub struct GoStrategy;

impl ParsingStrategy for GoStrategy {
    fn language_name(&self) -> &'static str {
        "go"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn parse_file(&self, relative_path: &str, content: &str) -> (SymbolTable, FileInfo) {
        let lines: Vec<&str> = content.lines().collect();
        let mut symbols = SymbolTable::new();
        let mut file_info = FileInfo::new("go", lines.len() as u32);
        let mut in_import_block = false;

        for (i, raw_line) in lines.iter().enumerate() {
            let line = raw_line.trim();

            if let Some(caps) = package_re().captures(line) {
                file_info.package = Some(caps[1].to_string());
                continue;
            }

            if line.starts_with("import ") {
                if let Some(caps) = single_import_re().captures(line) {
                    file_info.add_import(caps[1].to_string());
                } else if line.contains('(') {
                    in_import_block = true;
                }
                continue;
            }

            if in_import_block {
                if line.contains(')') {
                    in_import_block = false;
                } else if let Some(caps) = quoted_path_re().captures(line) {
                    file_info.add_import(caps[1].to_string());
                }
                continue;
            }

            if line.starts_with("func ") {
                if let Some(caps) = method_re().captures(line) {
                    let name = caps[1].to_string();
                    let id = symbol_id(relative_path, &name);
                    let docstring = extract_go_comment(&lines, i);
                    let sym = SymbolInfo::new(SymbolKind::Method, relative_path, (i + 1) as u32)
                        .with_signature(*raw_line)
                        .with_docstring(docstring);
                    symbols.insert(id, sym);
                    file_info.symbols.functions.push(name);
                } else if let Some(caps) = func_re().captures(line) {
                    let name = caps[1].to_string();
                    let id = symbol_id(relative_path, &name);
                    let docstring = extract_go_comment(&lines, i);
                    let sym = SymbolInfo::new(SymbolKind::Function, relative_path, (i + 1) as u32)
                        .with_signature(*raw_line)
                        .with_docstring(docstring);
                    symbols.insert(id, sym);
                    file_info.symbols.functions.push(name);
                }
                continue;
            }

            if let Some(caps) = struct_re().captures(line) {
                let name = caps[1].to_string();
                let id = symbol_id(relative_path, &name);
                let docstring = extract_go_comment(&lines, i);
                let sym = SymbolInfo::new(SymbolKind::Struct, relative_path, (i + 1) as u32)
                    .with_docstring(docstring);
                symbols.insert(id, sym);
                file_info.symbols.classes.push(name);
                continue;
            }

            if let Some(caps) = interface_re().captures(line) {
                let name = caps[1].to_string();
                let id = symbol_id(relative_path, &name);
                let docstring = extract_go_comment(&lines, i);
                let sym = SymbolInfo::new(SymbolKind::Interface, relative_path, (i + 1) as u32)
                    .with_docstring(docstring);
                symbols.insert(id, sym);
                file_info.symbols.classes.push(name);
            }
        }

        analyze_go_calls(&lines, relative_path, &mut file_info);

        (symbols, file_info)
    }
}

/// Track the enclosing function by declaration line and record every
/// call site as a pending call, skipping the declaration line itself so
/// a function's own parameter list isn't read as a self-call.
fn analyze_go_calls(lines: &[&str], relative_path: &str, file_info: &mut FileInfo) {
    let mut current_function: Option<String> = None;

    for raw_line in lines {
        let line = raw_line.trim();
        let is_declaration = line.starts_with("func ");

        if is_declaration {
            if let Some(caps) = func_name_re().captures(line) {
                current_function = Some(symbol_id(relative_path, &caps[1]));
            }
        }

        if let Some(caller_id) = current_function.as_ref().filter(|_| !is_declaration) {
            if line.contains('(') && line.contains(')') {
                for caps in call_name_re().captures_iter(line) {
                    file_info
                        .pending_calls
                        .push((caller_id.clone(), caps[1].to_string()));
                }
                for caps in call_method_re().captures_iter(line) {
                    file_info
                        .pending_calls
                        .push((caller_id.clone(), caps[1].to_string()));
                }
            }
        }
    }
}

/// Walk backward from the line before a declaration, collecting an
/// unbroken run of `//` lines or a single `/* ... */` block. A blank
/// line, or any non-comment line, stops the walk.
fn extract_go_comment(lines: &[&str], line_index: usize) -> Option<String> {
    let mut comment_lines: Vec<String> = Vec::new();
    let mut i = line_index as i64 - 1;

    while i >= 0 {
        let idx = i as usize;
        let stripped = lines[idx].trim();

        if stripped.is_empty() {
            break;
        }

        if let Some(rest) = stripped.strip_prefix("//") {
            comment_lines.insert(0, rest.trim().to_string());
            i -= 1;
            continue;
        }

        if stripped.starts_with("/*") && stripped.ends_with("*/") && stripped.len() >= 4 {
            let inner = &stripped[2..stripped.len() - 2];
            comment_lines.insert(0, inner.trim().to_string());
            i -= 1;
            continue;
        }

        if stripped.ends_with("*/") {
            let mut block: Vec<String> = vec![stripped[..stripped.len() - 2].trim().to_string()];
            i -= 1;
            while i >= 0 {
                let temp = lines[i as usize].trim();
                if let Some(rest) = temp.strip_prefix("/*") {
                    block.insert(0, rest.trim().to_string());
                    block.extend(comment_lines);
                    comment_lines = block;
                    i -= 1;
                    break;
                }
                block.insert(0, temp.to_string());
                i -= 1;
            }
            break;
        }

        break;
    }

    if comment_lines.is_empty() {
        None
    } else {
        let joined = comment_lines.join("\n");
        if joined.is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_package_imports_and_declarations() {
        let src = r#"package main

import (
	"fmt"
	"os"
)

// Add returns the sum of two ints.
func Add(a int, b int) int {
	return a + b
}

type Greeter struct {
	Name string
}

// Greet prints a greeting.
func (g *Greeter) Greet() {
	fmt.Println("hello")
}
"#;
        let strategy = GoStrategy;
        let (symbols, file_info) = strategy.parse_file("main.go", src);

        assert_eq!(file_info.package.as_deref(), Some("main"));
        assert_eq!(file_info.imports, vec!["fmt", "os"]);
        assert!(file_info.symbols.functions.contains(&"Add".to_string()));
        assert!(file_info.symbols.functions.contains(&"Greet".to_string()));
        assert!(file_info.symbols.classes.contains(&"Greeter".to_string()));

        let add = symbols.get("main.go::Add").unwrap();
        assert_eq!(add.kind, SymbolKind::Function);
        assert_eq!(add.docstring.as_deref(), Some("Add returns the sum of two ints."));

        let greet = symbols.get("main.go::Greet").unwrap();
        assert_eq!(greet.kind, SymbolKind::Method);
        assert_eq!(greet.docstring.as_deref(), Some("Greet prints a greeting."));
    }

    #[test]
    fn comment_extraction_stops_at_blank_line() {
        let src = "// orphaned comment\n\nfunc Solo() {}\n";
        let strategy = GoStrategy;
        let (symbols, _) = strategy.parse_file("a.go", src);
        assert_eq!(symbols.get("a.go::Solo").unwrap().docstring, None);
    }

    #[test]
    fn single_import_statement_is_recorded() {
        let src = "package p\n\nimport \"fmt\"\n\nfunc F() {}\n";
        let strategy = GoStrategy;
        let (_, file_info) = strategy.parse_file("a.go", src);
        assert_eq!(file_info.imports, vec!["fmt"]);
    }

    #[test]
    fn call_sites_are_recorded_as_pending_excluding_declaration_line() {
        let src = "func helper() {}\n\nfunc caller() {\n\thelper()\n\tobj.Method()\n}\n";
        let strategy = GoStrategy;
        let (_, file_info) = strategy.parse_file("a.go", src);
        let callees: Vec<&str> = file_info
            .pending_calls
            .iter()
            .map(|(_, n)| n.as_str())
            .collect();
        assert!(callees.contains(&"helper"));
        assert!(callees.contains(&"Method"));
    }
}
