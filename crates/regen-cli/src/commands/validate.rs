//! Validate command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use colored::Colorize;

use regen_markers::{ValidationReport, validate_markers};

use super::read_template;
use crate::error::Result;

/// Run the validate command
///
/// Every file is checked even after a failure. Exits with status 1 when any
/// file is invalid.
pub fn run_validate(templates: &[PathBuf]) -> Result<ExitCode> {
    let mut invalid = 0;
    for path in templates {
        let report = validate_markers(&read_template(path)?);
        print_report(path, &report);
        if !report.valid {
            invalid += 1;
        }
    }

    if invalid == 0 {
        Ok(ExitCode::SUCCESS)
    } else {
        println!();
        println!("{} of {} file(s) invalid", invalid, templates.len());
        Ok(ExitCode::FAILURE)
    }
}

fn print_report(path: &Path, report: &ValidationReport) {
    if report.valid {
        println!("{} {}", "OK".green().bold(), path.display());
        return;
    }

    println!("{} {}", "INVALID".red().bold(), path.display());
    for error in &report.errors {
        println!("  {} {}", "-".red(), error);
    }
}
