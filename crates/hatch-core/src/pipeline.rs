//! End-to-end template materialization.
//!
//! ```text
//! validate destination → fetch → template config → manifest check
//!     → rename paths → rewrite identifier → substitute variables → git init
//! ```
//!
//! Every stage works on the tree the previous one left behind. Only fetching
//! and repository initialization await the [`GitBackend`]; the rewrite stages
//! are plain synchronous filesystem work.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::backend::GitBackend;
use crate::config::TemplateConfig;
use crate::error::{HatchError, Result};
use crate::fetch;
use crate::identifier;
use crate::manifest;
use crate::patterns::NATIVE_EXTENSION;
use crate::project;
use crate::rename;
use crate::source::SourceSpec;
use crate::vars::{self, VariableMap};

/// Message of the commit created in the new repository.
pub const INITIAL_COMMIT_MESSAGE: &str = "Initial commit.";

/// Everything a run needs, as explicit values.
#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    pub source: SourceSpec,
    /// New module path.
    pub identifier: String,
    pub destination: PathBuf,
    /// Extra extension/filename patterns for rewriting.
    pub extensions: Vec<String>,
    pub variables: VariableMap,
    /// Proceed without a `go.mod`, skipping the identifier rewrite.
    pub force: bool,
    pub init_repository: bool,
}

impl MaterializeOptions {
    /// Human-readable list of what a run with these options would do.
    pub fn planned_actions(&self) -> Vec<String> {
        let mut actions = vec![format!(
            "fetch template and rewrite module path in all .{NATIVE_EXTENSION} files"
        )];
        if !self.extensions.is_empty() {
            actions.push("replace module path in files with the given extensions".into());
        }
        actions.push(format!(
            "replace template variables ({} → value)",
            vars::placeholder("Key")
        ));
        if self.init_repository {
            actions.push("initialize git repository with initial commit".into());
        }
        actions
    }
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Configure,
    Rename,
    Rewrite,
    Substitute,
    InitRepository,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Fetch,
        Stage::Configure,
        Stage::Rename,
        Stage::Rewrite,
        Stage::Substitute,
        Stage::InitRepository,
    ];

    /// 1-based position, for `[n/total]` progress lines.
    pub fn number(self) -> u32 {
        Self::ALL.iter().position(|s| *s == self).map_or(0, |i| i as u32 + 1)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fetch => "Fetching template",
            Self::Configure => "Reading template configuration",
            Self::Rename => "Renaming paths",
            Self::Rewrite => "Rewriting module path",
            Self::Substitute => "Replacing variables",
            Self::InitRepository => "Initializing git repository",
        })
    }
}

/// What a run changed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaterializeReport {
    pub destination: PathBuf,
    /// Module path declared by the template, if it had a `go.mod`.
    pub old_identifier: Option<String>,
    pub new_identifier: String,
    /// Effective extra patterns (caller's, then the template's).
    pub patterns: Vec<String>,
    pub variables: VariableMap,
    /// `"old → new"` entries in application order.
    pub renamed: Vec<String>,
    /// Files touched by the identifier rewrite.
    pub rewritten: Vec<String>,
    /// Files touched by variable substitution.
    pub substituted: Vec<String>,
    pub missing_manifest: bool,
    pub repository_initialized: bool,
}

/// Run the whole pipeline.
pub async fn materialize(
    options: &MaterializeOptions,
    backend: &dyn GitBackend,
) -> Result<MaterializeReport> {
    materialize_with_progress(options, backend, |_| {}).await
}

/// [`materialize`], calling `on_stage` as each stage starts.
pub async fn materialize_with_progress<F>(
    options: &MaterializeOptions,
    backend: &dyn GitBackend,
    mut on_stage: F,
) -> Result<MaterializeReport>
where
    F: FnMut(Stage) + Send,
{
    let dest = options.destination.as_path();
    project::validate_destination(dest)?;

    let mut report = MaterializeReport {
        destination: dest.to_path_buf(),
        new_identifier: options.identifier.clone(),
        variables: options.variables.clone(),
        ..MaterializeReport::default()
    };

    on_stage(Stage::Fetch);
    tracing::info!("fetching {} into {}", options.source, dest.display());
    fetch::fetch(&options.source, dest, backend).await?;

    on_stage(Stage::Configure);
    report.patterns = load_template_config(dest, &options.extensions)?;

    if !manifest::has_manifest(dest) {
        if !options.force {
            discard(dest);
            return Err(HatchError::MissingManifest(dest.to_path_buf()));
        }
        tracing::warn!("template has no {}, skipping module rewrite", manifest::MANIFEST_FILE);
        report.missing_manifest = true;
    }

    on_stage(Stage::Rename);
    report.renamed = rename::rename_paths(dest, &options.variables)?;
    tracing::info!("renamed {} paths", report.renamed.len());

    if !report.missing_manifest {
        on_stage(Stage::Rewrite);
        let old = manifest::read_module_path(dest)?;
        tracing::debug!("template module is {old}");
        report.rewritten =
            identifier::rewrite_identifier(dest, &options.identifier, &report.patterns)?;
        tracing::info!("rewrote {} files", report.rewritten.len());
        report.old_identifier = Some(old);
    }

    on_stage(Stage::Substitute);
    report.substituted = vars::substitute_variables(dest, &options.variables, &report.patterns)?;
    tracing::info!("substituted variables in {} files", report.substituted.len());

    if options.init_repository {
        on_stage(Stage::InitRepository);
        backend.init_repository(dest, INITIAL_COMMIT_MESSAGE).await?;
        report.repository_initialized = true;
    }

    Ok(report)
}

/// Read and delete the template's own configuration; returns the merged
/// extra patterns.
fn load_template_config(dest: &Path, extensions: &[String]) -> Result<Vec<String>> {
    let config = TemplateConfig::load(dest)?;
    if TemplateConfig::exists(dest) {
        tracing::debug!(
            "template config version {} with extensions {:?}",
            config.version,
            config.extensions
        );
        TemplateConfig::remove(dest)?;
    }
    Ok(config.merge_extensions(extensions))
}

fn discard(dest: &Path) {
    if let Err(e) = std::fs::remove_dir_all(dest) {
        tracing::warn!("could not remove {}: {e}", dest.display());
    }
}
