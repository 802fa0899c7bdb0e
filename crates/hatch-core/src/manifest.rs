//! Lenient `go.mod` handling.
//!
//! Only the `module` statement matters here. It is located tolerantly
//! (comments, CRLF line endings, quoted paths, extra whitespace, and the
//! block form `module ( path )` are accepted) and rewritten in place, so
//! every other byte of the file survives unchanged.

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::error::{HatchError, Result};

/// Name of the manifest at the project root.
pub const MANIFEST_FILE: &str = "go.mod";

/// A parsed `go.mod`, remembering where its module statement lives.
#[derive(Debug, Clone)]
pub struct Manifest {
    text: String,
    module_path: String,
    /// Bytes replaced when the module path changes.
    span: Range<usize>,
    /// True when `span` covers the whole `module <path>` statement rather
    /// than only the path inside a block.
    statement: bool,
}

impl Manifest {
    /// Find the module statement in `text`.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut offset = 0;
        let mut in_block = false;

        for raw_line in text.split_inclusive('\n') {
            let line_start = offset;
            offset += raw_line.len();

            let code = strip_comment(raw_line.trim_end_matches(['\n', '\r']));
            let trimmed = code.trim();
            if trimmed.is_empty() {
                continue;
            }
            let lead = code.len() - code.trim_start().len();

            if in_block {
                if trimmed == ")" {
                    return Err("empty module block".into());
                }
                let path = unquote(trimmed)?;
                let start = line_start + lead;
                return Ok(Self {
                    text: text.to_string(),
                    module_path: path,
                    span: start..start + trimmed.len(),
                    statement: false,
                });
            }

            let Some(rest) = trimmed.strip_prefix("module") else {
                continue;
            };
            if !rest.is_empty() && !rest.starts_with([' ', '\t', '(']) {
                // e.g. `modules`, some other keyword
                continue;
            }
            let rest = rest.trim();
            if rest == "(" {
                in_block = true;
                continue;
            }
            if rest.is_empty() {
                return Err("module statement without a path".into());
            }
            let start = line_start + lead;
            return Ok(Self {
                text: text.to_string(),
                module_path: unquote(rest)?,
                span: start..start + trimmed.len(),
                statement: true,
            });
        }

        Err("no module statement found".into())
    }

    /// The declared module path.
    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    /// The file contents with the module path replaced by `new_path`.
    ///
    /// A single-line statement is normalized to `module <path>`; trailing
    /// comments and all other lines are kept as they were.
    pub fn with_module_path(&self, new_path: &str) -> String {
        let path = quote_if_needed(new_path);
        let replacement = if self.statement {
            format!("module {path}")
        } else {
            path
        };
        let mut out = String::with_capacity(self.text.len() + replacement.len());
        out.push_str(&self.text[..self.span.start]);
        out.push_str(&replacement);
        out.push_str(&self.text[self.span.end..]);
        out
    }
}

/// Drop a `//` comment that is not inside a quoted string.
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(b'"') if b == b'\\' => i += 1,
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'`' => quote = Some(b),
            None if b == b'/' && bytes.get(i + 1) == Some(&b'/') => return &line[..i],
            None => {}
        }
        i += 1;
    }
    line
}

fn unquote(token: &str) -> std::result::Result<String, String> {
    if let Some(inner) = token.strip_prefix('`') {
        return inner
            .strip_suffix('`')
            .map(str::to_string)
            .ok_or_else(|| format!("unterminated raw string {token}"));
    }
    let Some(inner) = token.strip_prefix('"') else {
        if token.contains(char::is_whitespace) {
            return Err(format!("unexpected text after module path: {token}"));
        }
        return Ok(token.to_string());
    };
    let inner = inner
        .strip_suffix('"')
        .ok_or_else(|| format!("unterminated string {token}"))?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(escaped) => out.push(escaped),
                None => return Err(format!("dangling escape in {token}")),
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

fn quote_if_needed(path: &str) -> String {
    let plain = !path.is_empty()
        && !path.contains("//")
        && !path
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '`' | '\'' | '(' | ')' | ','));
    if plain {
        return path.to_string();
    }
    let mut out = String::with_capacity(path.len() + 2);
    out.push('"');
    for c in path.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Path of the manifest below `root`.
pub fn manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_FILE)
}

/// Whether `root` has a `go.mod`.
pub fn has_manifest(root: &Path) -> bool {
    manifest_path(root).is_file()
}

/// Read and parse the manifest below `root`.
pub fn load(root: &Path) -> Result<(PathBuf, Manifest)> {
    let path = manifest_path(root);
    let text =
        std::fs::read_to_string(&path).map_err(|e| HatchError::file_io("reading", &path, e))?;
    let manifest = Manifest::parse(&text).map_err(|message| HatchError::ManifestParse {
        path: path.clone(),
        message,
    })?;
    Ok((path, manifest))
}

/// The module path declared by the manifest below `root`.
pub fn read_module_path(root: &Path) -> Result<String> {
    Ok(load(root)?.1.module_path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let m = Manifest::parse("module github.com/user/template\n\ngo 1.22\n").unwrap();
        assert_eq!(m.module_path(), "github.com/user/template");
    }

    #[test]
    fn test_parse_lenient_variants() {
        let cases = [
            ("// leading comment\nmodule   example.com/a  // trailing\n", "example.com/a"),
            ("module \"example.com/quoted\"\r\ngo 1.21\r\n", "example.com/quoted"),
            ("\tmodule\texample.com/tab\n", "example.com/tab"),
            ("module (\n\texample.com/block\n)\n", "example.com/block"),
            ("module `example.com/raw`\n", "example.com/raw"),
            ("go 1.22\nmodule example.com/late", "example.com/late"),
        ];
        for (text, want) in cases {
            assert_eq!(Manifest::parse(text).unwrap().module_path(), want, "{text:?}");
        }
    }

    #[test]
    fn test_parse_missing_module() {
        assert!(Manifest::parse("go 1.22\n").is_err());
        assert!(Manifest::parse("").is_err());
        assert!(Manifest::parse("module\n").is_err());
        assert!(Manifest::parse("module \"unterminated\n").is_err());
        assert!(Manifest::parse("modules example.com/x\n").is_err());
    }

    #[test]
    fn test_rewrite_keeps_other_content() {
        let text = "// Template module\nmodule   github.com/user/template // keep me\n\ngo 1.22\n\nrequire (\n\tgithub.com/user/template/dep v1.0.0\n)\n";
        let m = Manifest::parse(text).unwrap();
        assert_eq!(
            m.with_module_path("github.com/me/app"),
            "// Template module\nmodule github.com/me/app // keep me\n\ngo 1.22\n\nrequire (\n\tgithub.com/user/template/dep v1.0.0\n)\n"
        );
    }

    #[test]
    fn test_rewrite_block_form() {
        let m = Manifest::parse("module (\n    example.com/old\n)\ngo 1.22\n").unwrap();
        assert_eq!(
            m.with_module_path("example.com/new"),
            "module (\n    example.com/new\n)\ngo 1.22\n"
        );
    }

    #[test]
    fn test_rewrite_quotes_when_needed() {
        let m = Manifest::parse("module example.com/old\n").unwrap();
        assert_eq!(m.with_module_path("my app"), "module \"my app\"\n");
    }

    #[test]
    fn test_read_module_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!has_manifest(dir.path()));
        assert!(read_module_path(dir.path()).is_err());

        std::fs::write(dir.path().join("go.mod"), "module example.com/x\n").unwrap();
        assert!(has_manifest(dir.path()));
        assert_eq!(read_module_path(dir.path()).unwrap(), "example.com/x");
    }

    #[test]
    fn test_load_parse_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("go.mod"), "go 1.22\n").unwrap();
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, HatchError::ManifestParse { .. }));
        assert!(err.to_string().contains("go.mod"));
    }
}
