//! Placeholder renaming of files and directories.
//!
//! Renaming runs in two phases. Discovery walks the tree once and records
//! every entry whose name changes under the variables. Application renames
//! the recorded entries deepest first, so a child is moved while its parent
//! still has the old name. Before each move both paths are remapped through
//! the renames already applied, which keeps a directory and an entry below
//! it consistent when both carry the same placeholder.

use std::path::{Path, PathBuf};

use crate::error::{HatchError, Result};
use crate::vars::VariableMap;
use crate::walk::{self, Prune};

/// Separator between old and new path in rename reports.
pub const ARROW: &str = " → ";

/// A pending rename, absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Rename {
    from: PathBuf,
    to: PathBuf,
}

/// Rename every entry below `root` whose name contains a placeholder.
///
/// Returns `"old → new"` entries relative to `root`, in application order.
pub fn rename_paths(root: &Path, vars: &VariableMap) -> Result<Vec<String>> {
    if vars.is_empty() {
        return Ok(Vec::new());
    }

    let mut pending = collect(root, vars)?;
    if pending.is_empty() {
        return Ok(Vec::new());
    }
    sort_deepest_first(&mut pending);

    let mut applied: Vec<Rename> = Vec::with_capacity(pending.len());
    let mut report = Vec::with_capacity(pending.len());

    for rename in pending {
        let from = remap(&rename.from, &applied);
        let to = remap(&rename.to, &applied);

        std::fs::rename(&from, &to).map_err(|source| HatchError::Rename {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;

        let entry = format!(
            "{}{ARROW}{}",
            walk::relative(root, &from)?,
            walk::relative(root, &to)?
        );
        tracing::debug!("renamed {entry}");
        report.push(entry);
        applied.push(Rename { from, to });
    }

    Ok(report)
}

/// Phase 1: one walk, one record per entry whose name changes.
fn collect(root: &Path, vars: &VariableMap) -> Result<Vec<Rename>> {
    let mut renames = Vec::new();
    for entry in walk::entries(root, Prune::MetadataAndVendor) {
        let entry = entry?;
        if entry.depth() == 0 {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        let renamed = vars.apply(name);
        if renamed != name {
            let from = entry.path().to_path_buf();
            let to = from.with_file_name(&*renamed);
            renames.push(Rename { from, to });
        }
    }
    Ok(renames)
}

fn depth(path: &Path) -> usize {
    path.components().count()
}

fn sort_deepest_first(renames: &mut [Rename]) {
    renames.sort_by(|a, b| {
        depth(&b.from)
            .cmp(&depth(&a.from))
            .then_with(|| a.from.cmp(&b.from))
    });
}

/// Rewrite `path` through renames already applied: a path equal to, or
/// nested below, an applied source now lives under its target.
fn remap(path: &Path, applied: &[Rename]) -> PathBuf {
    let mut current = path.to_path_buf();
    for rename in applied {
        if let Ok(rest) = current.strip_prefix(&rename.from) {
            current = if rest.as_os_str().is_empty() {
                rename.to.clone()
            } else {
                rename.to.join(rest)
            };
        }
    }
    current
}
