//! Template configuration shipped inside a template.
//!
//! A template may carry `.hatch.toml` at its root:
//!
//! ```toml
//! version = 1
//! extensions = ["md", "Makefile", ".yaml"]
//! ```
//!
//! The file is read after acquisition and removed from the generated project.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HatchError, Result};

/// Name of the template configuration file.
pub const CONFIG_FILE: &str = ".hatch.toml";

const DEFAULT_VERSION: u32 = 1;

/// Settings a template declares about itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Extra extension/filename patterns for rewriting.
    #[serde(default)]
    pub extensions: Vec<String>,
    /// Configuration format version.
    #[serde(default)]
    pub version: u32,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            version: DEFAULT_VERSION,
        }
    }
}

impl TemplateConfig {
    /// Load `<dir>/.hatch.toml`; a missing file yields the default.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = config_path(dir);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(HatchError::file_io("reading", &path, e)),
        };
        let mut config: Self = toml::from_str(&contents).map_err(|e| HatchError::ConfigParse {
            path: path.clone(),
            source: e,
        })?;
        if config.version == 0 {
            config.version = DEFAULT_VERSION;
        }
        Ok(config)
    }

    /// Whether `dir` contains a template configuration file.
    pub fn exists(dir: &Path) -> bool {
        config_path(dir).is_file()
    }

    /// Delete the configuration file; a missing file is not an error.
    pub fn remove(dir: &Path) -> Result<()> {
        let path = config_path(dir);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(HatchError::file_io("removing", &path, e)),
        }
    }

    /// `first` followed by this config's extensions, without duplicates.
    pub fn merge_extensions(&self, first: &[String]) -> Vec<String> {
        let mut merged: Vec<String> = Vec::with_capacity(first.len() + self.extensions.len());
        for ext in first.iter().chain(&self.extensions) {
            if !merged.contains(ext) {
                merged.push(ext.clone());
            }
        }
        merged
    }
}

fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE)
}
