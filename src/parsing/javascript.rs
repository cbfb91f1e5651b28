//! JavaScript parsing strategy (spec §4.1): a single-pass tree-sitter
//! CST walk that threads a `(current_class, current_function)` context
//! down through recursion instead of building a separate resolution
//! pass. JSDoc (`/** ... */`) immediately preceding a declaration is its
//! docstring; the signature is the declaration text up to its body.

use super::ParsingStrategy;
use crate::symbol::{FileInfo, SymbolInfo, SymbolTable};
use crate::types::{symbol_id, SymbolKind};
use tree_sitter::{Node, Parser};

pub struct JavaScriptStrategy;

impl ParsingStrategy for JavaScriptStrategy {
    fn language_name(&self) -> &'static str {
        "javascript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["js", "jsx", "mjs", "cjs"]
    }

    fn parse_file(&self, relative_path: &str, content: &str) -> (SymbolTable, FileInfo) {
        parse_js_like(relative_path, content, tree_sitter_javascript::LANGUAGE.into(), "javascript")
    }
}

/// Shared by the JavaScript and TypeScript strategies: both grammars
/// expose the same declaration/call node shapes, just with extra
/// TypeScript-only node kinds layered on top.
pub(super) fn parse_js_like(
    relative_path: &str,
    content: &str,
    language: tree_sitter::Language,
    language_name: &'static str,
) -> (SymbolTable, FileInfo) {
    let mut parser = Parser::new();
    let mut symbols = SymbolTable::new();
    let mut file_info = FileInfo::new(language_name, content.lines().count() as u32);

    if parser.set_language(&language).is_err() {
        return (symbols, file_info);
    }
    let Some(tree) = parser.parse(content, None) else {
        return (symbols, file_info);
    };

    collect_imports(tree.root_node(), content, &mut file_info);
    walk(
        tree.root_node(),
        content,
        relative_path,
        None,
        None,
        &mut symbols,
        &mut file_info,
    );

    (symbols, file_info)
}

fn collect_imports(root: Node, code: &str, file_info: &mut FileInfo) {
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() == "import_statement" {
            if let Some(source) = find_child_kind(child, "string") {
                let text = code[source.byte_range()].trim_matches(|c| c == '"' || c == '\'');
                file_info.add_import(text.to_string());
            }
        }
    }
}

fn find_child_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

pub(super) fn walk(
    node: Node,
    code: &str,
    relative_path: &str,
    current_class: Option<&str>,
    current_function: Option<&str>,
    symbols: &mut SymbolTable,
    file_info: &mut FileInfo,
) {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = code[name_node.byte_range()].to_string();
                let qualified = qualify(current_class, &name);
                let id = symbol_id(relative_path, &qualified);
                let sig = extract_signature(node, code);
                let doc = extract_doc_comment(node, code);
                symbols.insert(
                    id.clone(),
                    SymbolInfo::new(SymbolKind::Function, relative_path, start_line(node))
                        .with_signature(sig)
                        .with_docstring(doc),
                );
                file_info.symbols.functions.push(qualified);
                for_each_child(node, code, relative_path, current_class, Some(&id), symbols, file_info);
                return;
            }
        }
        "class_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = code[name_node.byte_range()].to_string();
                let id = symbol_id(relative_path, &name);
                let sig = extract_signature(node, code);
                let doc = extract_doc_comment(node, code);
                symbols.insert(
                    id,
                    SymbolInfo::new(SymbolKind::Class, relative_path, start_line(node))
                        .with_signature(sig)
                        .with_docstring(doc),
                );
                file_info.symbols.classes.push(name.clone());
                for_each_child(node, code, relative_path, Some(&name), current_function, symbols, file_info);
                return;
            }
        }
        "method_definition" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = code[name_node.byte_range()].to_string();
                let kind = if name == "constructor" {
                    SymbolKind::Constructor
                } else {
                    SymbolKind::Method
                };
                let qualified = qualify(current_class, &name);
                let id = symbol_id(relative_path, &qualified);
                let sig = extract_signature(node, code);
                let doc = extract_doc_comment(node, code);
                symbols.insert(
                    id.clone(),
                    SymbolInfo::new(kind, relative_path, start_line(node))
                        .with_signature(sig)
                        .with_docstring(doc),
                );
                for_each_child(node, code, relative_path, current_class, Some(&id), symbols, file_info);
                return;
            }
        }
        "call_expression" => {
            if let Some(caller_id) = current_function {
                if let Some(callee) = node.child_by_field_name("function") {
                    let name = callee_simple_name(callee, code);
                    if let Some(name) = name {
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

pub(super) fn qualify(current_class: Option<&str>, name: &str) -> String {
    match current_class {
        Some(class_name) => format!("{class_name}.{name}"),
        None => name.to_string(),
    }
}

pub(super) fn start_line(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

pub(super) fn extract_signature(node: Node, code: &str) -> String {
    let start = node.start_byte();
    let end = node
        .child_by_field_name("body")
        .map(|b| b.start_byte())
        .unwrap_or_else(|| node.end_byte());
    code[start..end].trim().to_string()
}

/// JSDoc block comment (`/** ... */`) on the node's previous sibling, or
/// the enclosing `export_statement`'s previous sibling when exported.
pub(super) fn extract_doc_comment(node: Node, code: &str) -> Option<String> {
    let comment_node = match node.parent() {
        Some(parent) if parent.kind() == "export_statement" => parent.prev_sibling(),
        _ => node.prev_sibling(),
    }?;

    if comment_node.kind() != "comment" {
        return None;
    }
    let text = &code[comment_node.byte_range()];
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

fn callee_simple_name(node: Node, code: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(code[node.byte_range()].to_string()),
        "member_expression" => node
            .child_by_field_name("property")
            .map(|p| code[p.byte_range()].to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_function_class_and_methods() {
        let src = r#"
/** Adds two numbers. */
function add(a, b) {
    return a + b;
}

class Greeter {
    /** Says hello. */
    greet() {
        return add(1, 2);
    }
}
"#;
        let strategy = JavaScriptStrategy;
        let (symbols, file_info) = strategy.parse_file("a.js", src);

        assert!(file_info.symbols.functions.contains(&"add".to_string()));
        assert!(file_info.symbols.classes.contains(&"Greeter".to_string()));

        let add = symbols.get("a.js::add").unwrap();
        assert_eq!(add.kind, SymbolKind::Function);
        assert_eq!(add.docstring.as_deref(), Some("Adds two numbers."));

        let greet = symbols.get("a.js::Greeter.greet").unwrap();
        assert_eq!(greet.kind, SymbolKind::Method);
        assert_eq!(greet.docstring.as_deref(), Some("Says hello."));

        assert!(file_info
            .pending_calls
            .iter()
            .any(|(caller, callee)| caller == "a.js::Greeter.greet" && callee == "add"));
    }

    #[test]
    fn constructor_gets_constructor_kind() {
        let src = "class Point {\n  constructor(x, y) {\n    this.x = x;\n  }\n}\n";
        let strategy = JavaScriptStrategy;
        let (symbols, _) = strategy.parse_file("a.js", src);
        let ctor = symbols.get("a.js::Point.constructor").unwrap();
        assert_eq!(ctor.kind, SymbolKind::Constructor);
    }
}
