//! Rust parsing strategy: not named by the original specification, but
//! a natural addition alongside the other tree-sitter strategies since
//! this very engine is itself written in Rust. Follows the same
//! `(current_class, current_function)` single-pass shape, with
//! `impl` blocks standing in for "class" (a `fn` inside an `impl`
//! becomes a method qualified by the type it's implemented on).

use super::ParsingStrategy;
use crate::symbol::{FileInfo, SymbolInfo, SymbolTable};
use crate::types::{symbol_id, SymbolKind};
use tree_sitter::{Node, Parser};

pub struct RustStrategy;

impl ParsingStrategy for RustStrategy {
    fn language_name(&self) -> &'static str {
        "rust"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["rs"]
    }

    fn parse_file(&self, relative_path: &str, content: &str) -> (SymbolTable, FileInfo) {
        let mut parser = Parser::new();
        let mut symbols = SymbolTable::new();
        let mut file_info = FileInfo::new("rust", content.lines().count() as u32);

        if parser.set_language(&tree_sitter_rust::LANGUAGE.into()).is_err() {
            return (symbols, file_info);
        }
        let Some(tree) = parser.parse(content, None) else {
            return (symbols, file_info);
        };

        let root = tree.root_node();
        collect_use_declarations(root, content, &mut file_info);
        walk(root, content, relative_path, None, None, &mut symbols, &mut file_info);

        (symbols, file_info)
    }
}

fn collect_use_declarations(node: Node, code: &str, file_info: &mut FileInfo) {
    match node.kind() {
        "use_declaration" => {
            if let Some(path) = flatten_use_tree(node, code) {
                file_info.add_import(path);
            }
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                collect_use_declarations(child, code, file_info);
            }
        }
    }
}

/// A lenient flattening of a `use` tree: joins identifier/scope segments
/// with `::`, ignoring `as` aliases, groups and globs (good enough for
/// an import inventory, not a full resolver).
fn flatten_use_tree(node: Node, code: &str) -> Option<String> {
    let text = code[node.byte_range()].trim();
    let text = text.strip_prefix("use ").unwrap_or(text);
    let text = text.trim_end_matches(';').trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn enclosing_impl_type(node: Node, code: &str) -> Option<String> {
    let mut parent = node.parent();
    while let Some(p) = parent {
        if p.kind() == "impl_item" {
            let type_node = p.child_by_field_name("type")?;
            return Some(code[type_node.byte_range()].to_string());
        }
        parent = p.parent();
    }
    None
}

fn walk(
    node: Node,
    code: &str,
    relative_path: &str,
    current_class: Option<&str>,
    current_function: Option<&str>,
    symbols: &mut SymbolTable,
    file_info: &mut FileInfo,
) {
    match node.kind() {
        "function_item" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = code[name_node.byte_range()].to_string();
                let impl_type = enclosing_impl_type(node, code);
                let is_method = impl_type.is_some();
                let class_name = impl_type.as_deref().or(current_class);
                let qualified = qualify(class_name, &name);
                let id = symbol_id(relative_path, &qualified);
                let kind = if is_method { SymbolKind::Method } else { SymbolKind::Function };
                let sig = extract_signature(node, code);
                let doc = extract_doc_comment(node, code);
                symbols.insert(
                    id.clone(),
                    SymbolInfo::new(kind, relative_path, start_line(node))
                        .with_signature(sig)
                        .with_docstring(doc),
                );
                if !is_method {
                    file_info.symbols.functions.push(qualified);
                }
                for_each_child(node, code, relative_path, current_class, Some(&id), symbols, file_info);
                return;
            }
        }
        "struct_item" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = code[name_node.byte_range()].to_string();
                let id = symbol_id(relative_path, &name);
                let sig = extract_signature_no_body(node, code);
                let doc = extract_doc_comment(node, code);
                symbols.insert(
                    id,
                    SymbolInfo::new(SymbolKind::Struct, relative_path, start_line(node))
                        .with_signature(sig)
                        .with_docstring(doc),
                );
                file_info.symbols.classes.push(name);
            }
        }
        "enum_item" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = code[name_node.byte_range()].to_string();
                let id = symbol_id(relative_path, &name);
                let doc = extract_doc_comment(node, code);
                symbols.insert(
                    id,
                    SymbolInfo::new(SymbolKind::Enum, relative_path, start_line(node)).with_docstring(doc),
                );
                file_info.symbols.classes.push(name);
            }
        }
        "trait_item" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = code[name_node.byte_range()].to_string();
                let id = symbol_id(relative_path, &name);
                let doc = extract_doc_comment(node, code);
                symbols.insert(
                    id,
                    SymbolInfo::new(SymbolKind::Interface, relative_path, start_line(node)).with_docstring(doc),
                );
                file_info.symbols.classes.push(name.clone());
                for_each_child(node, code, relative_path, Some(&name), current_function, symbols, file_info);
                return;
            }
        }
        "call_expression" => {
            if let Some(caller_id) = current_function {
                if let Some(callee) = node.child_by_field_name("function") {
                    if let Some(name) = callee_simple_name(callee, code) {
                        file_info.pending_calls.push((caller_id.to_string(), name));
                    }
                }
            }
        }
        _ => {}
    }

    for_each_child(node, code, relative_path, current_class, current_function, symbols, file_info);
}

fn for_each_child(
    node: Node,
    code: &str,
    relative_path: &str,
    current_class: Option<&str>,
    current_function: Option<&str>,
    symbols: &mut SymbolTable,
    file_info: &mut FileInfo,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, code, relative_path, current_class, current_function, symbols, file_info);
    }
}

fn qualify(current_class: Option<&str>, name: &str) -> String {
    match current_class {
        Some(class_name) => format!("{class_name}.{name}"),
        None => name.to_string(),
    }
}

fn start_line(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

fn extract_signature(node: Node, code: &str) -> String {
    let start = node.start_byte();
    let end = node
        .child_by_field_name("body")
        .map(|b| b.start_byte())
        .unwrap_or_else(|| node.end_byte());
    code[start..end].trim().to_string()
}

fn extract_signature_no_body(node: Node, code: &str) -> String {
    let text = code[node.byte_range()].trim();
    text.split('{').next().unwrap_or(text).trim().to_string()
}

/// A contiguous run of `///` or `//!` line doc-comments immediately
/// preceding the node.
fn extract_doc_comment(node: Node, code: &str) -> Option<String> {
    let mut doc_lines = Vec::new();
    let mut current = node.prev_sibling();

    while let Some(prev) = current {
        if prev.kind() != "line_comment" && prev.kind() != "block_comment" {
            break;
        }
        let text = code[prev.byte_range()].trim();
        if let Some(rest) = text.strip_prefix("///") {
            doc_lines.insert(0, rest.trim().to_string());
            current = prev.prev_sibling();
        } else {
            break;
        }
    }

    if doc_lines.is_empty() {
        None
    } else {
        Some(doc_lines.join("\n"))
    }
}

fn callee_simple_name(node: Node, code: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(code[node.byte_range()].to_string()),
        "field_expression" => node
            .child_by_field_name("field")
            .map(|f| code[f.byte_range()].to_string()),
        "scoped_identifier" => node
            .child_by_field_name("name")
            .map(|n| code[n.byte_range()].to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_free_functions_structs_and_methods() {
        let src = r#"
/// Adds two numbers.
fn add(a: i32, b: i32) -> i32 {
    a + b
}

struct Greeter {
    name: String,
}

impl Greeter {
    /// Says hello.
    fn greet(&self) -> i32 {
        add(1, 2)
    }
}
"#;
        let strategy = RustStrategy;
        let (symbols, file_info) = strategy.parse_file("a.rs", src);

        assert!(file_info.symbols.functions.contains(&"add".to_string()));
        assert!(file_info.symbols.classes.contains(&"Greeter".to_string()));

        let add = symbols.get("a.rs::add").unwrap();
        assert_eq!(add.kind, SymbolKind::Function);
        assert_eq!(add.docstring.as_deref(), Some("Adds two numbers."));

        let greet = symbols.get("a.rs::Greeter.greet").unwrap();
        assert_eq!(greet.kind, SymbolKind::Method);
        assert_eq!(greet.docstring.as_deref(), Some("Says hello."));

        assert!(file_info
            .pending_calls
            .iter()
            .any(|(caller, callee)| caller == "a.rs::Greeter.greet" && callee == "add"));
    }
}
