//! Unified error types for hatch.

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur while materializing a template.
#[derive(Error, Debug)]
pub enum HatchError {
    // --- Input validation ---

    /// The source specification string could not be interpreted.
    #[error("invalid source '{input}': {reason}")]
    InvalidSource { input: String, reason: String },

    /// A version marker (`path@marker`) was given for a local directory.
    #[error("version specifier '{marker}' not supported for local path {path}")]
    MarkerOnLocalPath { path: PathBuf, marker: String },

    /// The destination exists and already contains entries.
    #[error("directory {0} is not empty")]
    DestinationNotEmpty(PathBuf),

    /// The destination exists but is a file (or other non-directory).
    #[error("{0} exists and is not a directory")]
    DestinationNotDirectory(PathBuf),

    /// The acquired template has no `go.mod` and `--force` was not given.
    #[error("template has no go.mod at {0} (use --force to proceed anyway)")]
    MissingManifest(PathBuf),

    // --- Acquisition ---

    /// A git operation (`ls-remote`, `clone`, `checkout`, `init`, ...) failed.
    #[error("git {operation} failed: {message}")]
    Git {
        operation: &'static str,
        message: String,
    },

    /// A required external tool is not installed.
    #[error("required tool '{name}' not found — install: {install}")]
    MissingTool { name: String, install: String },

    // --- Transformation ---

    /// `go.mod` exists but no module statement could be recognized.
    #[error("failed to parse {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    /// A Go source file has a malformed package clause or import block.
    #[error("failed to parse {path}: {message}")]
    GoSyntax { path: PathBuf, message: String },

    /// Renaming a placeholder path failed.
    #[error("renaming {from} to {to}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing a file in the destination tree failed.
    #[error("{action} {path}")]
    FileIo {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- Configuration ---

    /// The template configuration file contains invalid TOML.
    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    // --- General ---

    /// A filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// An error while walking the template tree.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// A catch-all for errors from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HatchError {
    /// Wrap an I/O error with the action and path that produced it.
    pub fn file_io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileIo {
            action,
            path: path.into(),
            source,
        }
    }

    /// Build a [`HatchError::Git`] for the named operation.
    pub fn git(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Git {
            operation,
            message: message.into(),
        }
    }
}

/// Alias for `Result<T, HatchError>`.
pub type Result<T> = std::result::Result<T, HatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_error_names_operation() {
        let err = HatchError::git("checkout", "reference is not a tree: abc1234");
        let msg = err.to_string();
        assert!(msg.contains("checkout"));
        assert!(msg.contains("abc1234"));
    }

    #[test]
    fn test_file_io_error_names_path() {
        let err = HatchError::file_io(
            "writing",
            "/tmp/app/main.go",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "writing /tmp/app/main.go");
    }
}
