//! Merge command implementation
//!
//! Merges one existing file with one rendered template and prints, writes or
//! diffs the result. Nothing is recorded in the checksum registry.

use std::path::Path;
use std::process::ExitCode;

use colored::Colorize;
use similar::TextDiff;

use regen_core::{MergeEngine, MergeOptions, MergeResult};
use regen_fs::io;

use super::{exit_conflict_if, read_template};
use crate::context::Context;
use crate::error::Result;

/// Where the merge result goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutput<'a> {
    /// Merged content on stdout.
    Print,
    /// Merged content written to a file.
    Write(&'a Path),
    /// The full [`MergeResult`] as JSON.
    Json,
    /// Unified diff of existing vs merged content.
    Diff,
}

impl<'a> MergeOutput<'a> {
    pub fn from_flags(output: Option<&'a Path>, json: bool, diff: bool) -> Self {
        match (output, json, diff) {
            (_, true, _) => Self::Json,
            (_, _, true) => Self::Diff,
            (Some(path), _, _) => Self::Write(path),
            (None, false, false) => Self::Print,
        }
    }
}

/// Run the merge command
///
/// A missing `existing` file merges as empty. Exits with status 2 when the
/// merge reports conflicts; in that case `--output` is not written.
pub fn run_merge(
    ctx: &Context,
    existing: &Path,
    template: &Path,
    output: MergeOutput<'_>,
) -> Result<ExitCode> {
    let current = io::read_text_if_exists(existing)?.unwrap_or_default();
    let rendered = read_template(template)?;

    let engine = MergeEngine::with_options(MergeOptions {
        validate_template: ctx.config.validate_templates,
    });
    let result = engine.merge(&current, &rendered, &existing.to_string_lossy());

    match output {
        MergeOutput::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            return Ok(exit_conflict_if(!result.success));
        }
        MergeOutput::Diff => print_diff(existing, &current, &result.merged_content),
        MergeOutput::Print => print!("{}", result.merged_content),
        MergeOutput::Write(path) if result.success => {
            io::write_text(path, &result.merged_content)?;
            eprintln!(
                "{} {} ({} preserved, {} updated)",
                "Merged".green().bold(),
                path.display(),
                result.custom_blocks_preserved_count,
                result.generated_blocks_updated_count
            );
        }
        MergeOutput::Write(path) => {
            eprintln!("{} {} was not written", "Skipped".yellow().bold(), path.display());
        }
    }

    print_conflicts(&result);
    Ok(exit_conflict_if(!result.success))
}

/// Print conflicts to stderr so stdout stays clean merged content.
pub(crate) fn print_conflicts(result: &MergeResult) {
    if !result.has_conflicts() {
        return;
    }

    eprintln!();
    eprintln!("{}", "Conflicts (manual review required):".red().bold());
    for conflict in &result.conflicts {
        eprintln!("  {} {}: {}", "!".red(), conflict.marker.yellow(), conflict.message);
        if let Some(content) = conflict.previous_content.as_deref() {
            for line in content.lines() {
                eprintln!("    {}", line.dimmed());
            }
        }
    }
}

fn print_diff(existing: &Path, old: &str, new: &str) {
    if old == new {
        println!("{} No changes.", "OK".green().bold());
        return;
    }

    let name = existing.display();
    let (old_header, new_header) = (format!("{name} (existing)"), format!("{name} (merged)"));
    let diff = TextDiff::from_lines(old, new);
    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header(&old_header, &new_header)
        .to_string();

    for line in unified.lines() {
        let styled = if line.starts_with("+++") || line.starts_with("---") {
            line.bold()
        } else if line.starts_with('+') {
            line.green()
        } else if line.starts_with('-') {
            line.red()
        } else if line.starts_with("@@") {
            line.cyan()
        } else {
            line.normal()
        };
        println!("{styled}");
    }
}
