//! TypeScript parsing strategy (spec §4.1): reuses the JavaScript
//! strategy's tree-sitter walk for functions, classes, methods and
//! calls (the grammars share those node shapes), then runs a second
//! pass over the same tree for TypeScript-only declarations
//! (`interface`, `enum`) that JavaScript doesn't have.

use super::javascript;
use super::ParsingStrategy;
use crate::symbol::{FileInfo, SymbolInfo, SymbolTable};
use crate::types::{symbol_id, SymbolKind};
use tree_sitter::{Language, Node, Parser};

pub struct TypeScriptStrategy;

impl ParsingStrategy for TypeScriptStrategy {
    fn language_name(&self) -> &'static str {
        "typescript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["ts", "tsx"]
    }

    fn parse_file(&self, relative_path: &str, content: &str) -> (SymbolTable, FileInfo) {
        let language: Language = if relative_path.ends_with(".tsx") {
            tree_sitter_typescript::LANGUAGE_TSX.into()
        } else {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        };

        let (mut symbols, mut file_info) =
            javascript::parse_js_like(relative_path, content, language.clone(), "typescript");

        let mut parser = Parser::new();
        if parser.set_language(&language).is_ok() {
            if let Some(tree) = parser.parse(content, None) {
                collect_type_declarations(
                    tree.root_node(),
                    content,
                    relative_path,
                    None,
                    &mut symbols,
                    &mut file_info,
                );
            }
        }

        (symbols, file_info)
    }
}

/// A standalone pass for `interface_declaration` and `enum_declaration`
/// nodes, which `javascript::walk`'s node-kind dispatch doesn't know
/// about. Additive: it only ever inserts new symbols, never touches
/// what the shared JS pass already found.
fn collect_type_declarations(
    node: Node,
    code: &str,
    relative_path: &str,
    current_class: Option<&str>,
    symbols: &mut SymbolTable,
    file_info: &mut FileInfo,
) {
    match node.kind() {
        "interface_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = code[name_node.byte_range()].to_string();
                let qualified = javascript::qualify(current_class, &name);
                let id = symbol_id(relative_path, &qualified);
                let sig = javascript::extract_signature(node, code);
                let doc = javascript::extract_doc_comment(node, code);
                symbols.insert(
                    id,
                    SymbolInfo::new(SymbolKind::Interface, relative_path, javascript::start_line(node))
                        .with_signature(sig)
                        .with_docstring(doc),
                );
                file_info.symbols.classes.push(qualified.clone());
                recurse(node, code, relative_path, Some(&qualified), symbols, file_info);
                return;
            }
        }
        "enum_declaration" => {
            if let Some(name_node) = node.child_by_field_name("name") {
                let name = code[name_node.byte_range()].to_string();
                let qualified = javascript::qualify(current_class, &name);
                let id = symbol_id(relative_path, &qualified);
                let sig = javascript::extract_signature(node, code);
                let doc = javascript::extract_doc_comment(node, code);
                symbols.insert(
                    id,
                    SymbolInfo::new(SymbolKind::Enum, relative_path, javascript::start_line(node))
                        .with_signature(sig)
                        .with_docstring(doc),
                );
                file_info.symbols.classes.push(qualified);
            }
            return;
        }
        _ => {}
    }

    recurse(node, code, relative_path, current_class, symbols, file_info);
}

fn recurse(
    node: Node,
    code: &str,
    relative_path: &str,
    current_class: Option<&str>,
    symbols: &mut SymbolTable,
    file_info: &mut FileInfo,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_type_declarations(child, code, relative_path, current_class, symbols, file_info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_function_and_interface() {
        let src = r#"
/** Adds two numbers. */
function add(a: number, b: number): number {
    return a + b;
}

/** Describes a point. */
interface Point {
    x: number;
    y: number;
}

enum Direction {
    Up,
    Down,
}
"#;
        let strategy = TypeScriptStrategy;
        let (symbols, file_info) = strategy.parse_file("a.ts", src);

        assert!(file_info.symbols.functions.contains(&"add".to_string()));
        let add = symbols.get("a.ts::add").unwrap();
        assert_eq!(add.docstring.as_deref(), Some("Adds two numbers."));

        let point = symbols.get("a.ts::Point").unwrap();
        assert_eq!(point.kind, SymbolKind::Interface);
        assert_eq!(point.docstring.as_deref(), Some("Describes a point."));

        let direction = symbols.get("a.ts::Direction").unwrap();
        assert_eq!(direction.kind, SymbolKind::Enum);
    }
}
