//! File selection for content rewriting.
//!
//! A pattern is a bare extension (`toml`) or an exact filename (`justfile`).
//! Callers may write extensions with or without the leading dot. Every
//! pattern is checked both ways, so `justfile` also matches `x.justfile`.

use std::collections::BTreeSet;
use std::path::Path;

/// Extension of the project's native source files; always rewritten.
pub const NATIVE_EXTENSION: &str = "go";

/// A normalized set of extension/filename patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternSet {
    patterns: BTreeSet<String>,
}

impl PatternSet {
    /// Normalize raw patterns: strip one leading `.` and drop empty entries.
    pub fn normalize<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter_map(|p| {
                let p = p.as_ref();
                let p = p.strip_prefix('.').unwrap_or(p);
                (!p.is_empty()).then(|| p.to_string())
            })
            .collect();
        Self { patterns }
    }

    /// The pattern set for variable substitution: native sources plus `extra`.
    pub fn with_native<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::normalize(extra);
        set.patterns.insert(NATIVE_EXTENSION.to_string());
        set
    }

    /// True if `name` equals a pattern or its extension equals a pattern.
    pub fn matches(&self, name: &str) -> bool {
        if self.patterns.contains(name) {
            return true;
        }
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.patterns.contains(ext))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }
}
