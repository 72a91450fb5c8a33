//! Checksum registry commands: check and forget

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use colored::Colorize;

use regen_fs::io;

use crate::context::Context;
use crate::error::Result;

/// Run the check command
///
/// Advisory only: always exits successfully when the files can be read.
pub fn run_check(ctx: &Context, files: &[PathBuf]) -> Result<ExitCode> {
    let registry = ctx.load_registry()?;

    for path in files {
        let identity = ctx.identity(path)?;
        let text = io::read_text(path)?;

        if registry.get(&identity).is_none() {
            println!("  {} {} (no records)", "?".dimmed(), path.display());
            continue;
        }

        let report = registry.detect_modifications(&identity, &text);
        if report.modified {
            println!("  {} {}", "~".yellow(), path.display().to_string().yellow());
            for marker in &report.modified_markers {
                println!("    {} generated block '{}' was edited by hand", "-".yellow(), marker);
            }
        } else {
            println!("  {} {}", "OK".green(), path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Run the forget command
pub fn run_forget(ctx: &Context, file: Option<&Path>) -> Result<ExitCode> {
    let mut registry = ctx.load_registry()?;
    let before = registry.len();

    let identity = file.map(|path| ctx.identity(path)).transpose()?;
    registry.clear(identity.as_deref());
    ctx.save_registry(&registry)?;

    let removed = before - registry.len();
    match file {
        Some(path) if removed == 0 => println!("No records for {}", path.display()),
        Some(path) => println!("{} records for {}", "Forgot".green().bold(), path.display()),
        None => println!("{} records for {} file(s)", "Forgot".green().bold(), removed),
    }
    Ok(ExitCode::SUCCESS)
}
