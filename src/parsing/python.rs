//! Python parsing strategy (spec §4.1): line/indentation based, no
//! tree-sitter grammar. Python's block structure is whitespace, not
//! braces, so declarations are found by scanning for `def`/`async def`/
//! `class` headers and tracking the enclosing class through an indent
//! stack rather than a parsed AST.

use super::ParsingStrategy;
use crate::symbol::{FileInfo, SymbolInfo, SymbolTable};
use crate::types::{symbol_id, SymbolKind};
use regex::Regex;
use std::sync::OnceLock;

fn def_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:async\s+def|def)\s+([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap()
    })
}

fn class_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*class\s+([A-Za-z_][A-Za-z0-9_]*)\s*[:\(]").unwrap())
}

fn import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*import\s+(.+)$").unwrap())
}

fn from_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*from\s+([A-Za-z_][A-Za-z0-9_.]*)\s+import\s").unwrap())
}

fn module_assign_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*(?::[^=]+)?=\s*[^=]").unwrap())
}

fn call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)?)\s*\(").unwrap()
    })
}

pub struct PythonStrategy;

impl ParsingStrategy for PythonStrategy {
    fn language_name(&self) -> &'static str {
        "python"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["py"]
    }

    fn parse_file(&self, relative_path: &str, content: &str) -> (SymbolTable, FileInfo) {
        let lines: Vec<&str> = content.lines().collect();
        let mut symbols = SymbolTable::new();
        let mut file_info = FileInfo::new("python", lines.len() as u32);

        // (indent of the header line, name) for each enclosing scope.
        let mut class_stack: Vec<(usize, String)> = Vec::new();
        let mut func_stack: Vec<(usize, String)> = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                i += 1;
                continue;
            }

            let indent = indent_of(line);
            while class_stack.last().is_some_and(|(ind, _)| indent <= *ind) {
                class_stack.pop();
            }
            while func_stack.last().is_some_and(|(ind, _)| indent <= *ind) {
                func_stack.pop();
            }

            if let Some(caps) = import_re().captures(line) {
                for module in caps[1].split(',') {
                    let name = module.split_whitespace().next().unwrap_or("").trim_end_matches(',');
                    if !name.is_empty() {
                        file_info.add_import(name.to_string());
                    }
                }
                i += 1;
                continue;
            }
            if let Some(caps) = from_import_re().captures(line) {
                file_info.add_import(caps[1].to_string());
                i += 1;
                continue;
            }

            if let Some(caps) = class_re().captures(line) {
                let name = caps[1].to_string();
                let qualified = qualify(&class_stack, &name);
                let id = symbol_id(relative_path, &qualified);
                let docstring = extract_docstring(&lines, i + 1, indent);
                let sym = SymbolInfo::new(SymbolKind::Class, relative_path, (i + 1) as u32)
                    .with_docstring(docstring);
                symbols.insert(id, sym);
                file_info.symbols.classes.push(qualified);
                class_stack.push((indent, name));
                i += 1;
                continue;
            }

            if let Some(caps) = def_re().captures(line) {
                let func_name = caps[1].to_string();
                let (header, end_line) = gather_header(&lines, i);
                let is_method = class_stack.last().is_some();
                let qualified = if is_method {
                    format!("{}.{}", class_stack.last().unwrap().1, func_name)
                } else {
                    func_name.clone()
                };
                let id = symbol_id(relative_path, &qualified);
                let kind = if is_method { SymbolKind::Method } else { SymbolKind::Function };
                let signature = build_signature(&header, &func_name);
                let docstring = extract_docstring(&lines, end_line + 1, indent);
                let sym = SymbolInfo::new(kind, relative_path, (i + 1) as u32)
                    .with_signature(signature)
                    .with_docstring(docstring);
                symbols.insert(id.clone(), sym);
                if !is_method {
                    file_info.symbols.functions.push(qualified);
                }
                func_stack.push((indent, id));
                i = end_line + 1;
                continue;
            }

            if func_stack.is_empty() {
                if let Some(caps) = module_assign_re().captures(line) {
                    let name = caps[1].to_string();
                    let qualified = qualify(&class_stack, &name);
                    let id = symbol_id(relative_path, &qualified);
                    let kind = if name.chars().any(|c| c.is_ascii_lowercase()) {
                        SymbolKind::Variable
                    } else {
                        SymbolKind::Constant
                    };
                    let sym = SymbolInfo::new(kind, relative_path, (i + 1) as u32);
                    symbols.insert(id, sym);
                    i += 1;
                    continue;
                }
            }

            if let Some((_, caller_id)) = func_stack.last() {
                for caps in call_re().captures_iter(line) {
                    let callee = caps[1].to_string();
                    let simple = callee.rsplit('.').next().unwrap_or(&callee).to_string();
                    file_info.pending_calls.push((caller_id.clone(), simple));
                }
            }

            i += 1;
        }

        (symbols, file_info)
    }
}

fn qualify(class_stack: &[(usize, String)], name: &str) -> String {
    match class_stack.last() {
        Some((_, class_name)) => format!("{class_name}.{name}"),
        None => name.to_string(),
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Collect a `def`/`async def` header across as many lines as needed,
/// tracking bracket depth so the parameter list's own colons and commas
/// (inside annotations) don't get mistaken for the header's terminator.
/// Returns the joined header text and the index of its last line.
fn gather_header(lines: &[&str], start: usize) -> (String, usize) {
    let mut depth: i32 = 0;
    let mut header = String::new();
    let mut idx = start;
    loop {
        let line = lines[idx];
        for (pos, ch) in line.char_indices() {
            match ch {
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth -= 1,
                ':' if depth == 0 => {
                    header.push_str(&line[..=pos]);
                    return (header, idx);
                }
                _ => {}
            }
        }
        header.push_str(line);
        header.push(' ');
        if idx + 1 >= lines.len() {
            return (header, idx);
        }
        idx += 1;
    }
}

/// Rebuild a one-line `def name(...):` signature from a (possibly
/// multi-line) header, stripping type annotations, default values and
/// return-type annotations so parameters reduce to bare names.
fn build_signature(header: &str, name: &str) -> String {
    let Some(open) = header.find('(') else {
        return format!("def {name}():");
    };
    let mut depth = 0i32;
    let mut close = open;
    for (i, ch) in header[open..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = open + i;
                    break;
                }
            }
            _ => {}
        }
    }
    let params_raw = &header[open + 1..close];
    let params: Vec<String> = split_params(params_raw)
        .into_iter()
        .filter_map(parse_param)
        .collect();
    format!("def {name}({}):", params.join(", "))
}

/// Split a parameter list on top-level commas, ignoring commas nested
/// inside type-hint brackets like `Dict[str, int]`.
fn split_params(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, ch) in s.char_indices() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                let part = s[start..i].trim();
                if !part.is_empty() {
                    parts.push(part);
                }
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = s[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}

/// One parameter: a type-annotated parameter (with or without a default)
/// reduces to its bare name; a parameter with only a default and no
/// annotation is dropped; a plain name is kept as-is.
fn parse_param(segment: &str) -> Option<String> {
    let segment = segment.trim();
    if segment.is_empty() {
        return None;
    }
    let mut depth = 0i32;
    let mut colon_pos = None;
    let mut eq_pos = None;
    for (i, ch) in segment.char_indices() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ':' if depth == 0 && colon_pos.is_none() => colon_pos = Some(i),
            '=' if depth == 0 && eq_pos.is_none() => eq_pos = Some(i),
            _ => {}
        }
    }
    match (colon_pos, eq_pos) {
        (Some(c), Some(e)) if c < e => Some(segment[..c].trim().to_string()),
        (Some(c), None) => Some(segment[..c].trim().to_string()),
        (Some(_), Some(_)) => None,
        (None, Some(_)) => None,
        (None, None) => Some(segment.to_string()),
    }
}

/// The first string literal in a declaration's body, if the first
/// non-blank statement is one. Dedented the way Python's own docstring
/// tooling does: the opening line is stripped bare, the remaining lines
/// lose their common leading whitespace, and leading/trailing blank
/// lines are dropped.
fn extract_docstring(lines: &[&str], from: usize, header_indent: usize) -> Option<String> {
    let mut idx = from;
    while idx < lines.len() && lines[idx].trim().is_empty() {
        idx += 1;
    }
    if idx >= lines.len() {
        return None;
    }
    let line = lines[idx];
    if indent_of(line) <= header_indent {
        return None;
    }
    let trimmed = line.trim_start();

    let (quote, rest) = if let Some(r) = trimmed.strip_prefix("\"\"\"") {
        ("\"\"\"", r)
    } else if let Some(r) = trimmed.strip_prefix("'''") {
        ("'''", r)
    } else if let Some(r) = trimmed.strip_prefix('"') {
        ("\"", r)
    } else if let Some(r) = trimmed.strip_prefix('\'') {
        ("'", r)
    } else {
        return None;
    };

    let raw = if quote.len() == 3 {
        if let Some(end) = rest.find(quote) {
            rest[..end].to_string()
        } else {
            let mut collected = rest.to_string();
            let mut j = idx + 1;
            loop {
                if j >= lines.len() {
                    break;
                }
                let l = lines[j];
                if let Some(end) = l.find(quote) {
                    collected.push('\n');
                    collected.push_str(&l[..end]);
                    break;
                }
                collected.push('\n');
                collected.push_str(l);
                j += 1;
            }
            collected
        }
    } else {
        rest.find(quote).map(|end| rest[..end].to_string())?
    };

    let cleaned = clean_doc(&raw);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// PEP 257 `inspect.cleandoc`-style normalization: strip the first line,
/// dedent the rest by their shared minimum indentation, trim blank lines
/// off both ends.
fn clean_doc(raw: &str) -> String {
    let mut lines: Vec<String> = raw.split('\n').map(|l| l.to_string()).collect();
    if lines.is_empty() {
        return String::new();
    }

    let min_indent = lines[1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min();

    if let Some(min_indent) = min_indent {
        for line in lines.iter_mut().skip(1) {
            *line = if line.len() >= min_indent {
                line[min_indent..].to_string()
            } else {
                line.trim_start().to_string()
            };
        }
    }
    lines[0] = lines[0].trim().to_string();

    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }

    lines.join("\n").trim().to_string()
}
