//! hatch CLI — scaffold a new Go project from a template.
//!
//! ```text
//! hatch user/template github.com/me/myapp
//! hatch github.com/user/template@v1.0.0 github.com/me/myapp
//! hatch ./local-template github.com/me/myapp customdir
//! hatch -e toml -e justfile --var Author="Jane Doe" user/template github.com/me/myapp
//! ```
//!
//! The work happens in [`hatch_core::pipeline`]; this crate parses flags,
//! reports progress, and handles Ctrl-C.

mod commands;
mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use hatch_core::pipeline::MaterializeOptions;
use hatch_core::project;
use hatch_core::source::SourceSpec;
use hatch_core::vars::VariableMap;

#[derive(Parser, Debug)]
#[command(
    name = "hatch",
    about = "Create a new Go project from a template",
    version,
    after_help = "Source formats:
  user/repo                  GitHub shorthand
  github.com/user/repo       Full host path
  https://host/user/repo     URL
  user/repo@v1.0.0           Specific tag
  user/repo@main             Specific branch
  user/repo@abc1234          Specific commit
  ./local-template           Local directory"
)]
struct Cli {
    /// Template source (URL, shorthand, or local path), optionally @version
    source: String,

    /// Module path of the new project
    identifier: String,

    /// Output directory (default: last element of the module path)
    directory: Option<PathBuf>,

    /// Additional file extensions or filenames for replacement (e.g. -e toml -e justfile)
    #[arg(short = 'e', long = "extension", value_name = "EXT", value_delimiter = ',')]
    extensions: Vec<String>,

    /// Set a template variable (e.g. --var Author="Jane Doe")
    #[arg(long = "var", value_name = "KEY=VALUE")]
    vars: Vec<String>,

    /// Show what would be done without making any changes
    #[arg(long)]
    dry_run: bool,

    /// Proceed even if the template has no go.mod
    #[arg(short, long)]
    force: bool,

    /// Skip git repository initialization
    #[arg(long)]
    no_git_init: bool,

    /// Print the materialization report as JSON
    #[arg(long)]
    json: bool,

    /// Timeout for each git operation, in seconds
    #[arg(long, env = "HATCH_GIT_TIMEOUT", default_value_t = 300, value_name = "SECS")]
    timeout: u64,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn options(&self) -> anyhow::Result<MaterializeOptions> {
        let source = SourceSpec::parse(&self.source).context("parsing source")?;
        let destination = self
            .directory
            .clone()
            .unwrap_or_else(|| project::default_directory(&self.identifier));
        let variables =
            VariableMap::from_assignments(&self.vars, &project::default_project_name(&destination));

        Ok(MaterializeOptions {
            source,
            identifier: self.identifier.clone(),
            destination,
            extensions: self.extensions.clone(),
            variables,
            force: self.force,
            init_repository: !self.no_git_init,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let options = cli.options()?;
    tracing::debug!(?options, "resolved options");

    if cli.dry_run {
        commands::dry_run::run(&options);
        return Ok(());
    }

    let timeout = Duration::from_secs(cli.timeout);
    tokio::select! {
        result = commands::scaffold::run(&options, timeout, cli.json, cli.verbose > 0) => result,
        _ = tokio::signal::ctrl_c() => {
            output::print_error(&format!(
                "interrupted; {} may contain a partial project",
                options.destination.display()
            ));
            anyhow::bail!("interrupted")
        }
    }
}
