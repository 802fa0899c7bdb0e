//! Template variables and placeholder substitution.
//!
//! Placeholders use dunder syntax: `__Name__` is replaced by the value of
//! variable `Name`, in file contents here and in path names by
//! [`crate::rename`].

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::content;
use crate::error::Result;
use crate::patterns::PatternSet;
use crate::walk::{self, Prune};

/// Variable that is always present; defaults to the destination's base name.
pub const PROJECT_NAME: &str = "ProjectName";

/// The placeholder token for `key`.
pub fn placeholder(key: &str) -> String {
    format!("__{key}__")
}

/// Variable name to replacement value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariableMap(BTreeMap<String, String>);

impl VariableMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `key=value` assignments on top of `ProjectName`.
    ///
    /// The first `=` splits key from value; entries without `=` are ignored.
    /// Later entries override earlier ones, `ProjectName` included.
    pub fn from_assignments<I, S>(entries: I, default_project_name: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vars = Self::new();
        vars.insert(PROJECT_NAME, default_project_name);
        for entry in entries {
            if let Some((key, value)) = entry.as_ref().split_once('=') {
                vars.insert(key, value);
            }
        }
        vars
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replace every placeholder in `text`.
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut out = Cow::Borrowed(text);
        for (key, value) in self.iter() {
            let token = placeholder(key);
            if out.contains(&token) {
                out = Cow::Owned(out.replace(&token, value));
            }
        }
        out
    }

    /// Byte-level [`apply`](Self::apply); `None` if nothing was replaced.
    pub fn apply_bytes(&self, data: &[u8]) -> Option<Vec<u8>> {
        let mut current: Option<Vec<u8>> = None;
        for (key, value) in self.iter() {
            let haystack = current.as_deref().unwrap_or(data);
            if let Some(next) =
                content::replace_all(haystack, placeholder(key).as_bytes(), value.as_bytes())
            {
                current = Some(next);
            }
        }
        current
    }
}

impl fmt::Display for VariableMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

/// Replace placeholders in every native source file and every file matching
/// `extra_patterns`. Returns the modified files relative to `root`.
pub fn substitute_variables(
    root: &Path,
    vars: &VariableMap,
    extra_patterns: &[String],
) -> Result<Vec<String>> {
    if vars.is_empty() {
        return Ok(Vec::new());
    }

    let patterns = PatternSet::with_native(extra_patterns);
    let mut modified = Vec::new();

    for path in walk::files(root, Prune::MetadataAndVendor, |name| patterns.matches(name))? {
        if content::update_file(&path, |data| Ok(vars.apply_bytes(data)))? {
            let rel = walk::relative(root, &path)?;
            tracing::debug!("replaced variables in {rel}");
            modified.push(rel);
        }
    }

    Ok(modified)
}
