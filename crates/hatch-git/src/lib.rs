//! `git` command-line backend for hatch.
//!
//! Implements [`GitBackend`] by running the `git` executable: `ls-remote` to
//! classify version markers, `clone` (shallow whenever possible) and
//! `checkout` to acquire templates, and `init`/`add`/`commit` to set up the
//! generated project's repository.
//!
//! Every invocation runs with terminal prompts disabled and under a timeout
//! (five minutes by default). Dropping a pending operation kills its child
//! process.
//!
//! **Prerequisites**: `git`

mod command;
pub mod refs;

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use hatch_core::backend::{CloneOptions, GitBackend, RemoteRef};
use hatch_core::error::{HatchError, Result};

use command::{run_git, GIT_INSTALL};

/// Default timeout for a single git invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Author used for the initial commit when git has no identity configured.
pub const FALLBACK_AUTHOR_NAME: &str = "hatch";
pub const FALLBACK_AUTHOR_EMAIL: &str = "hatch@localhost";

/// [`GitBackend`] backed by the `git` executable found on `PATH`.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
    timeout: Duration,
}

impl GitCli {
    /// Locate `git` on `PATH`.
    pub fn new() -> Result<Self> {
        let program = which::which("git").map_err(|_| HatchError::MissingTool {
            name: "git".into(),
            install: GIT_INSTALL.into(),
        })?;
        Ok(Self::with_program(program))
    }

    /// Use a specific git executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn git<I, S>(
        &self,
        operation: &'static str,
        args: I,
        cwd: Option<&Path>,
    ) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        run_git(&self.program, args, cwd, self.timeout, operation).await
    }

    /// `git config --get key` in `dir`; `None` when unset.
    async fn config_value(&self, dir: &Path, key: &str) -> Option<String> {
        let value = self
            .git("config", ["config", "--get", key], Some(dir))
            .await
            .ok()?;
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    /// `-c` overrides for the initial commit.
    async fn commit_identity(&self, dir: &Path) -> Vec<String> {
        let mut args = Vec::new();
        if self.config_value(dir, "user.name").await.is_none()
            || self.config_value(dir, "user.email").await.is_none()
        {
            tracing::debug!("no git identity configured, committing as {FALLBACK_AUTHOR_NAME}");
            args.extend([
                "-c".to_string(),
                format!("user.name={FALLBACK_AUTHOR_NAME}"),
                "-c".to_string(),
                format!("user.email={FALLBACK_AUTHOR_EMAIL}"),
            ]);
        }
        args
    }
}

/// Arguments for `git clone`.
pub fn clone_args(url: &str, dest: &Path, options: &CloneOptions) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["clone".into(), "--quiet".into()];
    if let Some(depth) = options.depth {
        args.push("--depth".into());
        args.push(depth.to_string().into());
    }
    if options.single_branch {
        args.push("--single-branch".into());
    }
    if let Some(reference) = &options.reference {
        args.push("--branch".into());
        args.push(reference.short_name().into());
    }
    args.push("--".into());
    args.push(url.into());
    args.push(dest.as_os_str().to_owned());
    args
}

/// Arguments for `git checkout`; the revision can never be read as an option.
pub fn checkout_args(revision: &str) -> [&str; 5] {
    ["checkout", "--quiet", "--end-of-options", revision, "--"]
}

#[async_trait]
impl GitBackend for GitCli {
    fn name(&self) -> &'static str {
        "git"
    }

    async fn list_refs(&self, url: &str) -> Result<Vec<RemoteRef>> {
        tracing::debug!("listing references of {url}");
        let output = self
            .git("ls-remote", ["ls-remote", "--tags", "--heads", "--", url], None)
            .await?;
        Ok(refs::parse_ls_remote(&output))
    }

    async fn clone_repo(&self, url: &str, dest: &Path, options: &CloneOptions) -> Result<()> {
        self.git("clone", clone_args(url, dest, options), None).await?;
        Ok(())
    }

    async fn checkout(&self, repo: &Path, revision: &str) -> Result<()> {
        self.git("checkout", checkout_args(revision), Some(repo)).await?;
        Ok(())
    }

    async fn init_repository(&self, dir: &Path, message: &str) -> Result<()> {
        self.git("init", ["init", "--quiet"], Some(dir)).await?;
        self.git("add", ["add", "--all"], Some(dir)).await?;

        let mut args = self.commit_identity(dir).await;
        args.extend(
            [
                "-c",
                "commit.gpgsign=false",
                "commit",
                "--quiet",
                "--allow-empty",
                "--message",
                message,
            ]
            .map(String::from),
        );
        self.git("commit", args, Some(dir)).await?;
        tracing::info!("initialized git repository in {}", dir.display());
        Ok(())
    }
}
