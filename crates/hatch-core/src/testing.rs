//! Recording [`GitBackend`] double for acquisition and pipeline tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::{CloneOptions, GitBackend, RemoteRef};
use crate::error::{HatchError, Result};
use crate::fetch::copy_tree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListRefs(String),
    Clone { url: String, options: CloneOptions },
    Checkout(String),
    Init(String),
}

/// Records every call. A successful clone copies `template` (if set) into
/// the destination and adds a `.git` directory, like a real clone would.
#[derive(Default)]
pub struct FakeBackend {
    refs: Vec<RemoteRef>,
    template: Option<PathBuf>,
    list_error: Option<String>,
    clone_error: Option<String>,
    checkout_error: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_refs(mut self, refs: Vec<RemoteRef>) -> Self {
        self.refs = refs;
        self
    }

    pub fn with_template(mut self, template: &Path) -> Self {
        self.template = Some(template.to_path_buf());
        self
    }

    pub fn failing_list_refs(mut self, message: &str) -> Self {
        self.list_error = Some(message.into());
        self
    }

    pub fn failing_clone(mut self, message: &str) -> Self {
        self.clone_error = Some(message.into());
        self
    }

    pub fn failing_checkout(mut self, message: &str) -> Self {
        self.checkout_error = Some(message.into());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl GitBackend for FakeBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn list_refs(&self, url: &str) -> Result<Vec<RemoteRef>> {
        self.record(Call::ListRefs(url.into()));
        match &self.list_error {
            Some(msg) => Err(HatchError::git("ls-remote", msg.clone())),
            None => Ok(self.refs.clone()),
        }
    }

    async fn clone_repo(&self, url: &str, dest: &Path, options: &CloneOptions) -> Result<()> {
        self.record(Call::Clone {
            url: url.into(),
            options: options.clone(),
        });
        if let Some(msg) = &self.clone_error {
            return Err(HatchError::git("clone", msg.clone()));
        }
        match &self.template {
            Some(template) => copy_tree(template, dest)?,
            None => std::fs::create_dir_all(dest)?,
        }
        std::fs::create_dir_all(dest.join(".git/objects"))?;
        std::fs::write(dest.join(".git/HEAD"), "ref: refs/heads/main\n")?;
        Ok(())
    }

    async fn checkout(&self, _repo: &Path, revision: &str) -> Result<()> {
        self.record(Call::Checkout(revision.into()));
        match &self.checkout_error {
            Some(msg) => Err(HatchError::git("checkout", msg.clone())),
            None => Ok(()),
        }
    }

    async fn init_repository(&self, dir: &Path, message: &str) -> Result<()> {
        self.record(Call::Init(message.into()));
        std::fs::create_dir_all(dir.join(".git"))?;
        Ok(())
    }
}
