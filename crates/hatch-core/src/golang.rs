//! Import-aware rewriting of Go source files.
//!
//! Each file is parsed in full with the tree-sitter Go grammar; a tree with
//! any error or missing node is rejected. Import paths are taken from the
//! `import_spec` nodes, and changed paths are spliced back into the original
//! text, so everything else in the file, formatting included, is kept.

use std::ops::Range;

use tree_sitter::{Node, Parser, Tree};

/// One import path literal found in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Decoded import path.
    pub path: String,
    /// Byte range of the literal, quotes included.
    pub span: Range<usize>,
    /// Whether the literal is a raw (backquoted) string.
    pub raw: bool,
}

type ParseResult<T> = std::result::Result<T, String>;

const BOM: &str = "\u{feff}";

fn line_error(node: Node<'_>, message: impl std::fmt::Display) -> String {
    format!("line {}: {message}", node.start_position().row + 1)
}

fn parse_tree(src: &str) -> ParseResult<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|e| format!("loading Go grammar: {e}"))?;
    parser
        .parse(src, None)
        .ok_or_else(|| "parser produced no syntax tree".to_string())
}

/// Innermost error or missing node at or below `node`, leftmost first.
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let inner = node.children(&mut cursor).find_map(first_error);
    inner.or_else(|| (node.is_error() || node.is_missing()).then_some(node))
}

fn syntax_error(node: Node<'_>) -> String {
    match first_error(node) {
        Some(bad) if bad.is_missing() => line_error(bad, format!("expected {}", bad.kind())),
        Some(bad) => line_error(bad, "syntax error"),
        None => line_error(node, "syntax error"),
    }
}

/// Decode the body of an interpreted string literal.
fn unquote(body: &str) -> ParseResult<String> {
    fn digits(chars: &mut std::str::Chars<'_>, count: usize, radix: u32) -> ParseResult<u32> {
        let text: String = chars.by_ref().take(count).collect();
        if text.len() != count {
            return Err("escape sequence not terminated".into());
        }
        u32::from_str_radix(&text, radix).map_err(|_| format!("invalid escape digits {text:?}"))
    }

    let mut bytes = Vec::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            let mut buf = [0; 4];
            bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let escaped = chars.next().ok_or("escape sequence not terminated")?;
        let simple = match escaped {
            'a' => Some(0x07),
            'b' => Some(0x08),
            'f' => Some(0x0c),
            'n' => Some(b'\n'),
            'r' => Some(b'\r'),
            't' => Some(b'\t'),
            'v' => Some(0x0b),
            '\\' => Some(b'\\'),
            '"' => Some(b'"'),
            _ => None,
        };
        if let Some(b) = simple {
            bytes.push(b);
            continue;
        }
        match escaped {
            'x' => bytes.push(digits(&mut chars, 2, 16)? as u8),
            '0'..='7' => {
                let rest = digits(&mut chars, 2, 8)?;
                let value = escaped.to_digit(8).unwrap_or(0) * 64 + rest;
                let byte =
                    u8::try_from(value).map_err(|_| "octal escape value > 255".to_string())?;
                bytes.push(byte);
            }
            'u' | 'U' => {
                let count = if escaped == 'u' { 4 } else { 8 };
                let value = digits(&mut chars, count, 16)?;
                let c = char::from_u32(value).ok_or_else(|| {
                    format!("escape sequence is invalid Unicode code point {value:#x}")
                })?;
                let mut buf = [0; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
            other => return Err(format!("unknown escape sequence \\{other}")),
        }
    }
    String::from_utf8(bytes).map_err(|_| "import path is not valid UTF-8".to_string())
}

fn import_spec(spec: Node<'_>, src: &str, offset: usize) -> ParseResult<ImportSpec> {
    let literal = spec
        .child_by_field_name("path")
        .ok_or_else(|| line_error(spec, "expected import path"))?;
    let text = &src[literal.byte_range()];
    let span = literal.start_byte() + offset..literal.end_byte() + offset;
    match literal.kind() {
        "raw_string_literal" => Ok(ImportSpec {
            // Carriage returns are discarded from raw string values.
            path: text[1..text.len() - 1].replace('\r', ""),
            span,
            raw: true,
        }),
        "interpreted_string_literal" => Ok(ImportSpec {
            path: unquote(&text[1..text.len() - 1]).map_err(|e| line_error(literal, e))?,
            span,
            raw: false,
        }),
        other => Err(line_error(literal, format!("unexpected {other} as import path"))),
    }
}

/// Parse `src` and return the import paths of its import declarations.
///
/// The whole file must be syntactically valid Go: a package clause first,
/// then the imports, then other declarations.
pub fn parse_imports(src: &str) -> ParseResult<Vec<ImportSpec>> {
    let (offset, body) = match src.strip_prefix(BOM) {
        Some(rest) => (BOM.len(), rest),
        None => (0, src),
    };
    let tree = parse_tree(body)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(syntax_error(root));
    }

    let mut cursor = root.walk();
    let mut declarations = root
        .named_children(&mut cursor)
        .filter(|node| node.kind() != "comment");
    match declarations.next() {
        Some(node) if node.kind() == "package_clause" => {}
        Some(node) => return Err(line_error(node, "expected 'package'")),
        None => return Err("line 1: expected 'package'".into()),
    }

    let mut imports = Vec::new();
    let mut seen_other = false;
    for node in declarations {
        match node.kind() {
            "import_declaration" if seen_other => {
                return Err(line_error(node, "imports must appear before other declarations"));
            }
            "import_declaration" => {
                let mut specs = node.walk();
                for child in node.named_children(&mut specs) {
                    match child.kind() {
                        "import_spec" => imports.push(import_spec(child, body, offset)?),
                        "import_spec_list" => {
                            let mut list = child.walk();
                            for spec in child.named_children(&mut list) {
                                if spec.kind() == "import_spec" {
                                    imports.push(import_spec(spec, body, offset)?);
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            "package_clause" => return Err(line_error(node, "unexpected second package clause")),
            _ => seen_other = true,
        }
    }
    Ok(imports)
}

/// `path` with module prefix `old` replaced by `new`, if it has that prefix.
///
/// `old/sub` matches, `oldsub` does not.
pub fn rewrite_import_path(path: &str, old: &str, new: &str) -> Option<String> {
    if old.is_empty() {
        return None;
    }
    let rest = path.strip_prefix(old)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(format!("{new}{rest}"))
    } else {
        None
    }
}

fn literal(path: &str, raw: bool) -> String {
    if raw && !path.contains('`') {
        return format!("`{path}`");
    }
    let mut out = String::with_capacity(path.len() + 2);
    out.push('"');
    for c in path.chars() {
        match c {
            '"' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Rewrite every import of module `old` (or a package below it) to `new`.
///
/// Returns `None` when no import changes.
pub fn rewrite_imports(src: &str, old: &str, new: &str) -> ParseResult<Option<String>> {
    let mut edits: Vec<(Range<usize>, String)> = Vec::new();
    for spec in parse_imports(src)? {
        if let Some(path) = rewrite_import_path(&spec.path, old, new) {
            if path != spec.path {
                edits.push((spec.span, literal(&path, spec.raw)));
            }
        }
    }
    if edits.is_empty() {
        return Ok(None);
    }

    let mut out = src.to_string();
    for (span, replacement) in edits.into_iter().rev() {
        out.replace_range(span, &replacement);
    }
    Ok(Some(out))
}
