//! Template acquisition.
//!
//! Turns a [`SourceSpec`] into a plain directory tree at the destination.
//! Local templates are copied; remote templates are cloned through a
//! [`GitBackend`]. Either way no `.git` directory survives.
//!
//! ## Marker resolution
//!
//! A marker on a remote source may name a tag, a branch, or a revision.
//! The remote's references are listed first:
//! - tag match: shallow single-branch clone of the tag
//! - branch match: shallow single-branch clone of the branch
//! - no match, or the listing failed: full clone, then checkout of the
//!   marker as a revision (the only case that needs the whole history)

use std::path::Path;

use crate::backend::{CloneOptions, GitBackend, GitReference, RemoteRef};
use crate::error::{HatchError, Result};
use crate::source::SourceSpec;
use crate::walk::{self, Prune, VCS_DIR};

/// What a marker turned out to be on the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    Tag,
    Branch,
    /// Not advertised by the remote; treated as an exact revision.
    Unknown,
}

/// Classify `marker` against the advertised references. Tags win over
/// branches of the same name.
pub fn classify(refs: &[RemoteRef], marker: &str) -> RefKind {
    if refs.iter().any(|r| r.tag_name() == Some(marker)) {
        RefKind::Tag
    } else if refs.iter().any(|r| r.branch_name() == Some(marker)) {
        RefKind::Branch
    } else {
        RefKind::Unknown
    }
}

/// List the remote's references and classify `marker`.
///
/// A failed listing is not fatal: the marker is then assumed to be a
/// revision and resolved by a full clone.
pub async fn resolve_ref_kind(backend: &dyn GitBackend, url: &str, marker: &str) -> RefKind {
    match backend.list_refs(url).await {
        Ok(refs) => classify(&refs, marker),
        Err(e) => {
            tracing::warn!("listing references of {url} failed, assuming revision: {e}");
            RefKind::Unknown
        }
    }
}

/// Materialize `spec` into `dest`.
pub async fn fetch(spec: &SourceSpec, dest: &Path, backend: &dyn GitBackend) -> Result<()> {
    match spec {
        SourceSpec::Local { path } => {
            tracing::info!("copying local template {}", path.display());
            let (src, dst) = (path.clone(), dest.to_path_buf());
            tokio::task::spawn_blocking(move || copy_tree(&src, &dst))
                .await
                .map_err(anyhow::Error::from)?
        }
        SourceSpec::Remote { url, marker } => {
            fetch_remote(backend, url, marker.as_deref(), dest).await?;
            remove_metadata_dir(dest)
        }
    }
}

async fn fetch_remote(
    backend: &dyn GitBackend,
    url: &str,
    marker: Option<&str>,
    dest: &Path,
) -> Result<()> {
    let Some(marker) = marker else {
        tracing::info!("cloning default branch of {url} via {}", backend.name());
        return backend.clone_repo(url, dest, &CloneOptions::shallow()).await;
    };

    let reference = match resolve_ref_kind(backend, url, marker).await {
        RefKind::Tag => GitReference::Tag(marker.to_string()),
        RefKind::Branch => GitReference::Branch(marker.to_string()),
        RefKind::Unknown => {
            tracing::info!("cloning {url} and checking out revision {marker}");
            backend.clone_repo(url, dest, &CloneOptions::full()).await?;
            return backend.checkout(dest, marker).await;
        }
    };

    tracing::info!("cloning {reference} of {url}");
    backend
        .clone_repo(url, dest, &CloneOptions::shallow_reference(reference))
        .await
}

/// Recursively copy `src` into `dest`, preserving permission bits and
/// skipping every `.git` directory.
pub fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    if !src.is_dir() {
        return Err(HatchError::InvalidSource {
            input: src.display().to_string(),
            reason: "not a directory".into(),
        });
    }

    // Listed before `dest` exists, so a destination inside `src` is not copied into itself.
    let entries = walk::entries(src, Prune::Metadata).collect::<Result<Vec<_>>>()?;
    std::fs::create_dir_all(dest).map_err(|e| HatchError::file_io("creating", dest, e))?;

    for entry in entries {
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| anyhow::anyhow!(e))?;
        if rel.as_os_str().is_empty() {
            continue;
        }
        let target = dest.join(rel);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)
                .map_err(|e| HatchError::file_io("creating", &target, e))?;
        } else {
            // fs::copy carries the permission bits over.
            std::fs::copy(entry.path(), &target)
                .map_err(|e| HatchError::file_io("copying", entry.path(), e))?;
        }
    }

    Ok(())
}

/// Remove `<dir>/.git` if present.
pub fn remove_metadata_dir(dir: &Path) -> Result<()> {
    let meta = dir.join(VCS_DIR);
    let removed = match std::fs::symlink_metadata(&meta) {
        Ok(m) if m.is_dir() => std::fs::remove_dir_all(&meta),
        Ok(_) => std::fs::remove_file(&meta),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => Err(e),
    };
    removed.map_err(|e| HatchError::file_io("removing", meta, e))
}
