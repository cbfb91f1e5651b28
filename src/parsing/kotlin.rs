//! Kotlin parsing strategy (spec §4.1): single-pass tree-sitter walk
//! threading a `(current_class, current_function)` context, the same
//! shape as the JavaScript/TypeScript strategies but against Kotlin's
//! own grammar (`class_declaration`, `function_declaration`,
//! `navigation_expression` for `obj.method()` calls).

use super::ParsingStrategy;
use crate::symbol::{FileInfo, SymbolInfo, SymbolTable};
use crate::types::{symbol_id, SymbolKind};
use tree_sitter::{Node, Parser};

pub struct KotlinStrategy;

impl ParsingStrategy for KotlinStrategy {
    fn language_name(&self) -> &'static str {
        "kotlin"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["kt", "kts"]
    }

    fn parse_file(&self, relative_path: &str, content: &str) -> (SymbolTable, FileInfo) {
        let mut parser = Parser::new();
        let mut symbols = SymbolTable::new();
        let mut file_info = FileInfo::new("kotlin", content.lines().count() as u32);

        if parser.set_language(&tree_sitter_kotlin::language()).is_err() {
            return (symbols, file_info);
        }
        let Some(tree) = parser.parse(content, None) else {
            return (symbols, file_info);
        };

        let root = tree.root_node();
        collect_package_and_imports(root, content, &mut file_info);
        walk(root, content, relative_path, None, None, &mut symbols, &mut file_info);

        (symbols, file_info)
    }
}

fn collect_package_and_imports(root: Node, code: &str, file_info: &mut FileInfo) {
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        match child.kind() {
            "package_header" => {
                if let Some(id) = find_child_kind(child, "identifier") {
                    file_info.package = Some(code[id.byte_range()].to_string());
                }
            }
            "import_header" => {
                if let Some(id) = find_child_kind(child, "identifier") {
                    file_info.add_import(code[id.byte_range()].to_string());
                }
            }
            _ => {}
        }
    }
}

fn find_child_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

fn is_interface(node: Node) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == "interface")
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
        "class_declaration" => {
            if let Some(name_node) = find_child_kind(node, "type_identifier")
                .or_else(|| find_child_kind(node, "simple_identifier"))
            {
                let name = code[name_node.byte_range()].to_string();
                let kind = if is_interface(node) { SymbolKind::Interface } else { SymbolKind::Class };
                let qualified = qualify(current_class, &name);
                let id = symbol_id(relative_path, &qualified);
                let sig = extract_signature(node, code);
                let doc = extract_doc_comment(node, code);
                symbols.insert(
                    id,
                    SymbolInfo::new(kind, relative_path, start_line(node))
                        .with_signature(sig)
                        .with_docstring(doc),
                );
                file_info.symbols.classes.push(qualified.clone());
                for_each_child(node, code, relative_path, Some(&qualified), current_function, symbols, file_info);
                return;
            }
        }
        "function_declaration" => {
            if let Some(name_node) = find_child_kind(node, "simple_identifier") {
                let name = code[name_node.byte_range()].to_string();
                let is_method = current_class.is_some();
                let qualified = qualify(current_class, &name);
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
        "call_expression" => {
            if let Some(caller_id) = current_function {
                if let Some(name) = callee_simple_name(node, code) {
                    file_info.pending_calls.push((caller_id.to_string(), name));
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

/// A `/** ... */` KDoc block comment immediately preceding the node.
fn extract_doc_comment(node: Node, code: &str) -> Option<String> {
    let prev = node.prev_sibling()?;
    if prev.kind() != "comment" {
        return None;
    }
    let text = &code[prev.byte_range()];
    if !text.starts_with("/**") {
        return None;
    }
    let cleaned = text
        .trim_start_matches("/**")
        .trim_end_matches("*/")
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn callee_simple_name(call_node: Node, code: &str) -> Option<String> {
    let callee = call_node.child(0)?;
    match callee.kind() {
        "simple_identifier" => Some(code[callee.byte_range()].to_string()),
        "navigation_expression" => {
            let mut cursor = callee.walk();
            callee
                .children(&mut cursor)
                .find(|c| c.kind() == "navigation_suffix")
                .and_then(|suffix| find_child_kind(suffix, "simple_identifier"))
                .map(|id| code[id.byte_range()].to_string())
        }
        _ => None,
    }
}
