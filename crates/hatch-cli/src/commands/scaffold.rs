use std::time::Duration;

use anyhow::Result;

use hatch_core::pipeline::{self, MaterializeOptions, MaterializeReport, Stage};
use hatch_git::GitCli;

use crate::output;

/// Materialize a template into a new project.
///
/// Fetches the template, renames placeholder paths, rewrites the module
/// path, substitutes variables, and initializes a git repository. Progress
/// is shown as numbered steps with a spinner; with `json` only the final
/// report is printed.
pub async fn run(
    options: &MaterializeOptions,
    timeout: Duration,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let backend = backend(options)?.with_timeout(timeout);

    if !json {
        output::print_header(&format!("hatch: {}", options.identifier));
        output::print_key_value("Source", &options.source.to_string());
        output::print_key_value("Directory", &options.destination.display().to_string());
    }

    let spinner = (!json).then(|| output::spinner("Starting"));
    let total = Stage::ALL.len() as u32;
    let result = pipeline::materialize_with_progress(options, &backend, |stage| {
        if let Some(bar) = &spinner {
            bar.suspend(|| output::print_step(stage.number(), total, &stage.to_string()));
            bar.set_message(format!("{stage}..."));
        }
    })
    .await;
    if let Some(bar) = &spinner {
        bar.finish_and_clear();
    }
    let report = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, verbose);
    }
    Ok(())
}

/// git is only required for remote templates and repository setup; a
/// local-only run gets a backend that reports the missing tool if used.
fn backend(options: &MaterializeOptions) -> Result<GitCli> {
    match GitCli::new() {
        Ok(git) => Ok(git),
        Err(e) if !options.source.is_local() || options.init_repository => Err(e.into()),
        Err(_) => Ok(GitCli::with_program("git")),
    }
}

fn print_report(report: &MaterializeReport, verbose: bool) {
    println!();
    if report.missing_manifest {
        output::print_warning("Template has no go.mod, module rewrite skipped");
    }
    if let Some(old) = &report.old_identifier {
        output::print_key_value("Module", &format!("{old} → {}", report.new_identifier));
    }
    if !report.patterns.is_empty() {
        output::print_key_value("Extensions", &report.patterns.join(", "));
    }
    output::print_key_value("Variables", &report.variables.to_string());

    for (label, entries) in [
        ("Renamed", &report.renamed),
        ("Rewritten", &report.rewritten),
        ("Variables replaced in", &report.substituted),
    ] {
        output::print_key_value(label, &format!("{} entries", entries.len()));
        if verbose {
            output::print_list(entries);
        }
    }

    if report.repository_initialized {
        output::print_success("Initialized git repository with initial commit");
    }
    output::print_success(&format!("Created {}", report.destination.display()));
}
