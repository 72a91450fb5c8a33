//! Stats command implementation

use std::path::Path;
use std::process::ExitCode;

use colored::Colorize;

use regen_core::get_merge_statistics;
use regen_fs::io;

use super::read_template;
use crate::error::Result;

/// Run the stats command
pub fn run_stats(existing: &Path, template: &Path, json: bool) -> Result<ExitCode> {
    let current = io::read_text_if_exists(existing)?.unwrap_or_default();
    let rendered = read_template(template)?;
    let stats = get_merge_statistics(&existing.to_string_lossy(), &current, &rendered);

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} {}", "Stats".blue().bold(), existing.display().to_string().yellow());
    println!("  total blocks:       {}", stats.total_blocks);
    println!("  custom blocks:      {}", stats.custom_blocks);
    println!("  generated blocks:   {}", stats.generated_blocks);
    let conflicting = stats.conflicting_blocks.to_string();
    if stats.conflicting_blocks > 0 {
        println!("  conflicting blocks: {}", conflicting.red().bold());
    } else {
        println!("  conflicting blocks: {}", conflicting.green());
    }
    Ok(ExitCode::SUCCESS)
}
