//! Command implementations for regen-cli

pub mod apply;
pub mod completions;
pub mod merge;
pub mod registry;
pub mod stats;
pub mod validate;

pub use apply::run_apply;
pub use completions::run_completions;
pub use merge::{MergeOutput, run_merge};
pub use registry::{run_check, run_forget};
pub use stats::run_stats;
pub use validate::run_validate;

use std::path::Path;
use std::process::ExitCode;

use regen_fs::io;

use crate::error::{CliError, Result};

/// Exit status when a merge would lose custom code.
pub(crate) const EXIT_CONFLICT: u8 = 2;

pub(crate) fn exit_conflict_if(conflicted: bool) -> ExitCode {
    if conflicted {
        ExitCode::from(EXIT_CONFLICT)
    } else {
        ExitCode::SUCCESS
    }
}

/// Reads a rendered template. A missing template is a usage error rather
/// than an I/O failure.
pub(crate) fn read_template(path: &Path) -> Result<String> {
    io::read_text_if_exists(path)?
        .ok_or_else(|| CliError::user(format!("template not found: {}", path.display())))
}
