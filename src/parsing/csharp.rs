//! C# parsing strategy (spec §4.1): single-pass tree-sitter walk with a
//! `(current_class, current_function)` context. C# documentation
//! comments are XML `///` triple-slash lines rather than block
//! comments, so doc extraction collects a run of them instead of a
//! single `/** */` block.

use super::ParsingStrategy;
use crate::symbol::{FileInfo, SymbolInfo, SymbolTable};
use crate::types::{symbol_id, SymbolKind};
use tree_sitter::{Node, Parser};

pub struct CSharpStrategy;

impl ParsingStrategy for CSharpStrategy {
    fn language_name(&self) -> &'static str {
        "csharp"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["cs"]
    }

    fn parse_file(&self, relative_path: &str, content: &str) -> (SymbolTable, FileInfo) {
        let mut parser = Parser::new();
        let mut symbols = SymbolTable::new();
        let mut file_info = FileInfo::new("csharp", content.lines().count() as u32);

        if parser.set_language(&tree_sitter_c_sharp::LANGUAGE.into()).is_err() {
            return (symbols, file_info);
        }
        let Some(tree) = parser.parse(content, None) else {
            return (symbols, file_info);
        };

        let root = tree.root_node();
        collect_usings(root, content, &mut file_info);
        walk(root, content, relative_path, None, None, &mut symbols, &mut file_info);

        (symbols, file_info)
    }
}

fn collect_usings(node: Node, code: &str, file_info: &mut FileInfo) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "using_directive" {
            if let Some(name) = find_child_kind(child, "qualified_name")
                .or_else(|| find_child_kind(child, "identifier"))
            {
                file_info.add_import(code[name.byte_range()].to_string());
            }
        } else if matches!(child.kind(), "compilation_unit" | "namespace_declaration" | "file_scoped_namespace_declaration") {
            collect_usings(child, code, file_info);
        }
    }
}

fn find_child_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
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
        "class_declaration" | "struct_declaration" | "record_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = code[name_node.byte_range()].to_string();
                let qualified = qualify(current_class, &name);
                let id = symbol_id(relative_path, &qualified);
                let kind = if node.kind() == "struct_declaration" { SymbolKind::Struct } else { SymbolKind::Class };
                let sig = extract_signature(node, code);
                let doc = extract_xml_doc(node, code);
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
        "interface_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = code[name_node.byte_range()].to_string();
                let qualified = qualify(current_class, &name);
                let id = symbol_id(relative_path, &qualified);
                let sig = extract_signature(node, code);
                let doc = extract_xml_doc(node, code);
                symbols.insert(
                    id,
                    SymbolInfo::new(SymbolKind::Interface, relative_path, start_line(node))
                        .with_signature(sig)
                        .with_docstring(doc),
                );
                file_info.symbols.classes.push(qualified.clone());
                for_each_child(node, code, relative_path, Some(&qualified), current_function, symbols, file_info);
                return;
            }
        }
        "enum_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = code[name_node.byte_range()].to_string();
                let qualified = qualify(current_class, &name);
                let id = symbol_id(relative_path, &qualified);
                let doc = extract_xml_doc(node, code);
                symbols.insert(
                    id,
                    SymbolInfo::new(SymbolKind::Enum, relative_path, start_line(node)).with_docstring(doc),
                );
                file_info.symbols.classes.push(qualified);
            }
            return;
        }
        "method_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = code[name_node.byte_range()].to_string();
                let qualified = qualify(current_class, &name);
                let id = symbol_id(relative_path, &qualified);
                let sig = extract_signature(node, code);
                let doc = extract_xml_doc(node, code);
                symbols.insert(
                    id.clone(),
                    SymbolInfo::new(SymbolKind::Method, relative_path, start_line(node))
                        .with_signature(sig)
                        .with_docstring(doc),
                );
                for_each_child(node, code, relative_path, current_class, Some(&id), symbols, file_info);
                return;
            }
        }
        "constructor_declaration" => {
            let name = current_class.unwrap_or("constructor").to_string();
            let qualified = qualify(current_class, &name);
            let id = symbol_id(relative_path, &qualified);
            let sig = extract_signature(node, code);
            let doc = extract_xml_doc(node, code);
            symbols.insert(
                id.clone(),
                SymbolInfo::new(SymbolKind::Constructor, relative_path, start_line(node))
                    .with_signature(sig)
                    .with_docstring(doc),
            );
            for_each_child(node, code, relative_path, current_class, Some(&id), symbols, file_info);
            return;
        }
        "invocation_expression" => {
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

fn callee_simple_name(node: Node, code: &str) -> Option<String> {
    match node.kind() {
        "identifier" => Some(code[node.byte_range()].to_string()),
        "member_access_expression" => node
            .child_by_field_name("name")
            .map(|n| code[n.byte_range()].to_string()),
        _ => None,
    }
}

/// A contiguous run of `///` XML doc-comment lines preceding the node,
/// skipping over attribute and modifier siblings the way declarations
/// are usually decorated (`[Obsolete] public void Foo()`).
fn extract_xml_doc(node: Node, code: &str) -> Option<String> {
    let mut doc_lines = Vec::new();
    let mut current = node.prev_sibling();

    while let Some(prev) = current {
        match prev.kind() {
            "comment" | "xml_doc_comment" => {
                let text = code[prev.byte_range()].trim().to_string();
                if text.starts_with("///") {
                    doc_lines.insert(0, text);
                    current = prev.prev_sibling();
                } else {
                    break;
                }
            }
            "modifier" | "attribute_list" => {
                current = prev.prev_sibling();
            }
            _ => break,
        }
    }

    if doc_lines.is_empty() {
        return None;
    }
    let cleaned = doc_lines
        .iter()
        .flat_map(|doc| doc.lines())
        .map(|line| line.trim_start_matches("///").trim())
        .collect::<Vec<_>>()
        .join("\n");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
