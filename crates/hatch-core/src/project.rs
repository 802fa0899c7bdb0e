//! Destination directory checks and naming defaults.

use std::path::{Path, PathBuf};

use crate::error::{HatchError, Result};

/// Check that `dest` is absent or an empty directory. Nothing is created.
pub fn validate_destination(dest: &Path) -> Result<()> {
    let metadata = match std::fs::metadata(dest) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(HatchError::file_io("checking", dest, e)),
    };
    if !metadata.is_dir() {
        return Err(HatchError::DestinationNotDirectory(dest.to_path_buf()));
    }
    let mut entries =
        std::fs::read_dir(dest).map_err(|e| HatchError::file_io("reading", dest, e))?;
    if entries.next().is_some() {
        return Err(HatchError::DestinationNotEmpty(dest.to_path_buf()));
    }
    Ok(())
}

/// Directory used when none is given: the last `/` segment of the identifier.
pub fn default_directory(identifier: &str) -> PathBuf {
    let trimmed = identifier.trim_end_matches('/');
    let base = trimmed.rsplit('/').next().unwrap_or(trimmed);
    if base.is_empty() {
        PathBuf::from(".")
    } else {
        PathBuf::from(base)
    }
}

/// Default value of `ProjectName`: the destination's base name.
pub fn default_project_name(dest: &Path) -> String {
    match dest.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => dest.display().to_string(),
    }
}
