use std::fmt;
use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

const TAG_PREFIX: &str = "refs/tags/";
const BRANCH_PREFIX: &str = "refs/heads/";

/// One reference advertised by a remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    /// Full reference name, e.g. `refs/tags/v1.0.0` or `refs/heads/main`.
    pub name: String,
    /// Object id the reference points at.
    pub target: String,
}

impl RemoteRef {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
        }
    }

    /// Short tag name if this is a tag (peeled `^{}` entries included).
    pub fn tag_name(&self) -> Option<&str> {
        let short = self.name.strip_prefix(TAG_PREFIX)?;
        Some(short.strip_suffix("^{}").unwrap_or(short))
    }

    /// Short branch name if this is a branch head.
    pub fn branch_name(&self) -> Option<&str> {
        self.name.strip_prefix(BRANCH_PREFIX)
    }
}

/// A named reference to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitReference {
    Tag(String),
    Branch(String),
}

impl GitReference {
    /// Name as accepted by `git clone --branch`.
    pub fn short_name(&self) -> &str {
        match self {
            Self::Tag(name) | Self::Branch(name) => name,
        }
    }

    /// Fully qualified reference name.
    pub fn full_name(&self) -> String {
        match self {
            Self::Tag(name) => format!("{TAG_PREFIX}{name}"),
            Self::Branch(name) => format!("{BRANCH_PREFIX}{name}"),
        }
    }
}

impl fmt::Display for GitReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// How to clone a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloneOptions {
    /// History depth; `None` clones everything.
    pub depth: Option<u32>,
    /// Reference to check out instead of the remote's default branch.
    pub reference: Option<GitReference>,
    /// Fetch only the history of `reference`.
    pub single_branch: bool,
}

impl CloneOptions {
    /// Depth-1 clone of the default branch.
    pub fn shallow() -> Self {
        Self {
            depth: Some(1),
            ..Self::default()
        }
    }

    /// Depth-1, single-branch clone of a tag or branch.
    pub fn shallow_reference(reference: GitReference) -> Self {
        Self {
            depth: Some(1),
            reference: Some(reference),
            single_branch: true,
        }
    }

    /// Unbounded clone; needed when an arbitrary revision must be reachable.
    pub fn full() -> Self {
        Self::default()
    }
}

/// Version-control capability used by acquisition and repository setup.
///
/// The production implementation wraps the `git` command line
/// (`hatch_git::GitCli`); tests substitute a recording fake.
#[async_trait]
pub trait GitBackend: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &'static str;

    /// List the tags and branches advertised by `url` without cloning.
    async fn list_refs(&self, url: &str) -> Result<Vec<RemoteRef>>;

    /// Clone `url` into `dest`.
    async fn clone_repo(&self, url: &str, dest: &Path, options: &CloneOptions) -> Result<()>;

    /// Check out `revision` (detached) in the working tree at `repo`.
    async fn checkout(&self, repo: &Path, revision: &str) -> Result<()>;

    /// Initialize a repository at `dir`, stage everything, and commit.
    async fn init_repository(&self, dir: &Path, message: &str) -> Result<()>;
}
