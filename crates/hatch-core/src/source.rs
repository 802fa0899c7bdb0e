//! Source specification parsing.
//!
//! A source spec names where a template comes from:
//!
//! ```text
//! user/repo                 GitHub shorthand
//! github.com/user/repo      host/path, fetched over https
//! codeberg.org/user/repo    any other git host
//! user/repo@v1.0.0          tag, branch, or revision marker
//! ./local-template          local directory (no marker allowed)
//! ```
//!
//! The marker is split off at the *last* `@`. There is no escaping, so a
//! path that itself contains `@` cannot carry a marker reliably. Whether a
//! marker names a tag, a branch, or a revision is decided later by
//! [`crate::fetch`], which needs the network to find out.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{HatchError, Result};

const DEFAULT_HOST: &str = "https://github.com/";
const URL_SCHEMES: &[&str] = &["https://", "http://", "ssh://", "git://", "file://"];

/// Where a template is acquired from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceSpec {
    /// A git repository reachable over the network.
    Remote {
        url: String,
        /// Unclassified tag / branch / revision marker.
        marker: Option<String>,
    },
    /// A directory on the local filesystem.
    Local { path: PathBuf },
}

impl SourceSpec {
    /// Parse a raw source specification.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(HatchError::InvalidSource {
                input: input.to_string(),
                reason: "empty source".into(),
            });
        }

        let (path, marker) = split_marker(input);
        if path.is_empty() {
            return Err(HatchError::InvalidSource {
                input: input.to_string(),
                reason: "missing repository path before '@'".into(),
            });
        }

        if is_local(path) {
            if let Some(marker) = marker {
                return Err(HatchError::MarkerOnLocalPath {
                    path: PathBuf::from(path),
                    marker: marker.to_string(),
                });
            }
            return Ok(Self::Local {
                path: PathBuf::from(path),
            });
        }

        Ok(Self::Remote {
            url: build_git_url(path),
            marker: marker.map(str::to_string),
        })
    }

    /// The version marker, if any. Always `None` for local sources.
    pub fn marker(&self) -> Option<&str> {
        match self {
            Self::Remote { marker, .. } => marker.as_deref(),
            Self::Local { .. } => None,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local { .. })
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote { url, marker: None } => write!(f, "{url}"),
            Self::Remote {
                url,
                marker: Some(marker),
            } => write!(f, "{url}@{marker}"),
            Self::Local { path } => write!(f, "{} (local)", path.display()),
        }
    }
}

/// Split `path@marker` at the last `@`. An empty marker counts as none.
pub fn split_marker(input: &str) -> (&str, Option<&str>) {
    match input.rsplit_once('@') {
        Some((path, "")) => (path, None),
        Some((path, marker)) => (path, Some(marker)),
        None => (input, None),
    }
}

fn is_local(path: &str) -> bool {
    path.starts_with("./") || path.starts_with('/') || Path::new(path).is_dir()
}

/// Expand a host path or `owner/repo` shorthand into a full https URL.
pub fn build_git_url(path: &str) -> String {
    if URL_SCHEMES.iter().any(|scheme| path.starts_with(scheme)) {
        return path.to_string();
    }
    match path.split_once('/') {
        Some((host, _)) if host.contains('.') => format!("https://{path}"),
        _ => format!("{DEFAULT_HOST}{path}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(url: &str, marker: Option<&str>) -> SourceSpec {
        SourceSpec::Remote {
            url: url.into(),
            marker: marker.map(Into::into),
        }
    }

    #[test]
    fn test_split_marker_at_last_at() {
        assert_eq!(split_marker("user/repo"), ("user/repo", None));
        assert_eq!(split_marker("user/repo@v1.0.0"), ("user/repo", Some("v1.0.0")));
        assert_eq!(
            split_marker("github.com/user/repo@v2.1.0"),
            ("github.com/user/repo", Some("v2.1.0"))
        );
        assert_eq!(split_marker("a@b/repo@main"), ("a@b/repo", Some("main")));
        assert_eq!(split_marker("user/repo@"), ("user/repo", None));
    }

    #[test]
    fn test_build_git_url() {
        let cases = [
            ("user/repo", "https://github.com/user/repo"),
            ("github.com/user/repo", "https://github.com/user/repo"),
            ("codeberg.org/user/repo", "https://codeberg.org/user/repo"),
            ("gitlab.com/user/repo", "https://gitlab.com/user/repo"),
            ("user/repo/subdir", "https://github.com/user/repo/subdir"),
            ("singlepart", "https://github.com/singlepart"),
            ("https://example.com/x/y", "https://example.com/x/y"),
        ];
        for (input, want) in cases {
            assert_eq!(build_git_url(input), want, "input: {input}");
        }
    }

    #[test]
    fn test_parse_shorthand() {
        assert_eq!(
            SourceSpec::parse("user/repo").unwrap(),
            remote("https://github.com/user/repo", None)
        );
    }

    #[test]
    fn test_parse_remote_with_marker() {
        let spec = SourceSpec::parse("codeberg.org/user/template@abc1234").unwrap();
        assert_eq!(spec, remote("https://codeberg.org/user/template", Some("abc1234")));
        assert_eq!(spec.marker(), Some("abc1234"));
    }

    #[test]
    fn test_parse_local_paths() {
        assert_eq!(
            SourceSpec::parse("./my-template").unwrap(),
            SourceSpec::Local {
                path: PathBuf::from("./my-template")
            }
        );
        assert!(SourceSpec::parse("/abs/template").unwrap().is_local());
    }

    #[test]
    fn test_parse_local_with_marker_fails() {
        for input in ["./x@v1", "/abs@v1"] {
            let err = SourceSpec::parse(input).unwrap_err();
            assert!(
                matches!(err, HatchError::MarkerOnLocalPath { .. }),
                "input: {input}"
            );
        }
    }

    #[test]
    fn test_parse_existing_directory_is_local() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap().to_string();
        assert!(SourceSpec::parse(&path).unwrap().is_local());
    }

    #[test]
    fn test_parse_existing_directory_with_marker_fails() {
        // A relative name that exists as a directory, without a ./ prefix.
        let dir = tempfile::tempdir_in(".").unwrap();
        let name = dir.path().file_name().unwrap().to_str().unwrap().to_string();
        let err = SourceSpec::parse(&format!("{name}@v1")).unwrap_err();
        assert!(matches!(err, HatchError::MarkerOnLocalPath { .. }));
    }

    #[test]
    fn test_parse_empty_is_invalid() {
        assert!(matches!(
            SourceSpec::parse("  "),
            Err(HatchError::InvalidSource { .. })
        ));
        assert!(matches!(
            SourceSpec::parse("@v1"),
            Err(HatchError::InvalidSource { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(
            remote("https://github.com/u/r", Some("v1")).to_string(),
            "https://github.com/u/r@v1"
        );
        assert_eq!(
            SourceSpec::Local {
                path: PathBuf::from("./tpl")
            }
            .to_string(),
            "./tpl (local)"
        );
    }
}
