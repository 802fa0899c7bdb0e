use hatch_core::pipeline::MaterializeOptions;
use hatch_core::source::SourceSpec;

use crate::output;

/// Show what a run would do without touching the filesystem or network.
pub fn run(options: &MaterializeOptions) {
    output::print_header("hatch: dry run (no changes will be made)");

    match &options.source {
        SourceSpec::Remote { url, marker } => {
            output::print_key_value("Source", url);
            if let Some(marker) = marker {
                output::print_key_value("Version", marker);
            }
        }
        SourceSpec::Local { path } => {
            output::print_key_value("Source", &format!("{} (local)", path.display()));
        }
    }
    output::print_key_value("Directory", &options.destination.display().to_string());
    output::print_key_value("Module", &options.identifier);
    if !options.extensions.is_empty() {
        output::print_key_value("Extensions", &options.extensions.join(", "));
    }
    output::print_key_value("Variables", &options.variables.to_string());
    if options.force {
        output::print_key_value("Force", "--force (skip go.mod validation)");
    }
    if !options.init_repository {
        output::print_key_value("Git", "--no-git-init (skip initialization)");
    }

    println!();
    println!("  Would:");
    output::print_list(&options.planned_actions());
    println!();
}
