//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// regen - Regenerate source files without losing hand-written code
#[derive(Parser, Debug)]
#[command(name = "regen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to regen.toml (defaults to ./regen.toml when present)
    #[arg(long, global = true, env = "REGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Merge an existing file with a freshly rendered template
    ///
    /// Custom blocks keep the existing content, generated blocks and the text
    /// around them come from the template. Exits with status 2 when custom
    /// blocks would be lost.
    ///
    /// Examples:
    ///   regen merge user.service.ts rendered.ts            # print merged text
    ///   regen merge user.service.ts rendered.ts --diff     # preview changes
    ///   regen merge user.service.ts rendered.ts -o out.ts  # write to a file
    Merge {
        /// The file currently on disk
        existing: PathBuf,

        /// The freshly rendered template
        template: PathBuf,

        /// Write the merged content here instead of stdout
        #[arg(short, long, conflicts_with_all = ["json", "diff"])]
        output: Option<PathBuf>,

        /// Output the merge result as JSON
        #[arg(long, conflicts_with = "diff")]
        json: bool,

        /// Show a unified diff of existing vs merged content
        #[arg(long)]
        diff: bool,
    },

    /// Check templates for malformed block markers
    Validate {
        /// Template files to validate
        #[arg(required = true)]
        templates: Vec<PathBuf>,
    },

    /// Show block counts for a prospective merge
    Stats {
        /// The file currently on disk
        existing: PathBuf,

        /// The freshly rendered template
        template: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Merge a template into its target file and record checksums
    ///
    /// Creates the target when it does not exist. What happens on conflict
    /// is controlled by `on_conflict` in regen.toml.
    Apply {
        /// File to create or update
        target: PathBuf,

        /// The freshly rendered template
        template: PathBuf,

        /// Output the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report generated blocks that were edited by hand
    Check {
        /// Files to check against the checksum registry
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Drop checksum records for a file, or for every file
    Forget {
        /// File whose records to drop; all records when omitted
        file: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
