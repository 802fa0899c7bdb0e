//! Tree walking shared by the acquisition and rewrite stages.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::error::{HatchError, Result};

/// Version-control metadata directory; never copied, renamed, or rewritten.
pub const VCS_DIR: &str = ".git";

/// Vendored dependencies; left untouched by every rewrite stage.
pub const VENDOR_DIR: &str = "vendor";

/// Which directories a walk prunes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prune {
    /// Only the version-control metadata directory.
    Metadata,
    /// Metadata and vendored dependencies.
    MetadataAndVendor,
}

impl Prune {
    fn skips(self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name();
        match self {
            Self::Metadata => name == VCS_DIR,
            Self::MetadataAndVendor => name == VCS_DIR || name == VENDOR_DIR,
        }
    }
}

/// Walk `root` depth-first in name order, pruning the directories `prune` names.
pub fn entries(root: &Path, prune: Prune) -> impl Iterator<Item = Result<DirEntry>> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| !prune.skips(e))
        .map(|e| e.map_err(HatchError::from))
}

/// All regular files under `root` whose name satisfies `select`.
pub fn files<F>(root: &Path, prune: Prune, mut select: F) -> Result<Vec<PathBuf>>
where
    F: FnMut(&str) -> bool,
{
    let mut out = Vec::new();
    for entry in entries(root, prune) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(&mut select) {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

/// `path` relative to `root`, rendered for reports.
pub fn relative(root: &Path, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(root).map_err(|_| {
        anyhow::anyhow!("{} is not inside {}", path.display(), root.display())
    })?;
    Ok(rel.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join(".git/objects")).unwrap();
        fs::create_dir_all(root.join("vendor/lib")).unwrap();
        fs::create_dir_all(root.join("pkg/.git")).unwrap();
        fs::write(root.join(".git/config"), "x").unwrap();
        fs::write(root.join("vendor/lib/lib.go"), "x").unwrap();
        fs::write(root.join("pkg/.git/HEAD"), "x").unwrap();
        fs::write(root.join("pkg/a.go"), "x").unwrap();
        fs::write(root.join("main.go"), "x").unwrap();
        dir
    }

    #[test]
    fn test_files_prunes_metadata_at_any_depth() {
        let dir = tree();
        let found = files(dir.path(), Prune::Metadata, |_| true).unwrap();
        let rel: Vec<_> = found
            .iter()
            .map(|p| relative(dir.path(), p).unwrap())
            .collect();
        assert!(rel.contains(&"main.go".to_string()));
        assert!(rel.iter().any(|p| p.ends_with("lib.go")));
        assert!(!rel.iter().any(|p| p.contains(".git")));
    }

    #[test]
    fn test_files_prunes_vendor() {
        let dir = tree();
        let found = files(dir.path(), Prune::MetadataAndVendor, |n| n.ends_with(".go")).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| !p.to_string_lossy().contains("vendor")));
    }

    #[test]
    fn test_relative_outside_root_is_error() {
        assert!(relative(Path::new("/a/b"), Path::new("/c/d")).is_err());
    }
}
