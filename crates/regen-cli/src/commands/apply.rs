//! Apply command implementation
//!
//! Loads the checksum registry, applies one template to its target, and
//! saves the registry again.

use std::path::Path;
use std::process::ExitCode;

use colored::Colorize;

use regen_core::{Applier, ApplyOutcome, ApplyStatus};

use super::{exit_conflict_if, read_template};
use super::merge::print_conflicts;
use crate::context::Context;
use crate::error::Result;

/// Run the apply command
///
/// Exits with status 2 when the merge needs manual review, whether or not
/// the conflict policy wrote the file.
pub fn run_apply(ctx: &Context, target: &Path, template: &Path, json: bool) -> Result<ExitCode> {
    let rendered = read_template(template)?;
    let target = std::path::absolute(target)?;

    let mut registry = ctx.load_registry()?;
    let outcome = Applier::new(&ctx.config, &ctx.root).apply(&mut registry, &target, &rendered)?;
    ctx.save_registry(&registry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }
    Ok(exit_conflict_if(outcome.needs_review()))
}

fn print_outcome(outcome: &ApplyOutcome) {
    let path = outcome.path.display().to_string();

    for problem in &outcome.template_errors {
        eprintln!("{} template: {}", "warning".yellow().bold(), problem);
    }
    for marker in &outcome.modified_markers {
        eprintln!(
            "{} generated block '{}' was edited by hand; the template replaced it",
            "warning".yellow().bold(),
            marker
        );
    }

    match &outcome.status {
        ApplyStatus::Created => println!("  {} {}", "+".green(), path.green()),
        ApplyStatus::Updated => {
            let counts = outcome
                .merge
                .as_ref()
                .map(|m| {
                    format!(
                        " ({} preserved, {} updated)",
                        m.custom_blocks_preserved_count, m.generated_blocks_updated_count
                    )
                })
                .unwrap_or_default();
            println!("  {} {}{}", "~".yellow(), path.yellow(), counts);
        }
        ApplyStatus::Unchanged => println!("  {} {} (unchanged)", "=".normal(), path),
        ApplyStatus::Conflicted { written, backup } => {
            let action = if *written { "written" } else { "left untouched" };
            println!("  {} {} ({})", "!".red(), path.red(), action);
            if let Some(backup) = backup {
                println!("    orphaned blocks saved to {}", backup.display().to_string().cyan());
            }
            if let Some(merge) = &outcome.merge {
                print_conflicts(merge);
            }
        }
    }
}
