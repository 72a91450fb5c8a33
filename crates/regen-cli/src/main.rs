//! regen CLI
//!
//! Command-line front end for the regeneration-safe merge engine.

mod cli;
mod commands;
mod context;
mod error;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use context::Context;
use error::Result;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    tracing::debug!(command = ?cli.command, "starting");

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Merge {
            existing,
            template,
            output,
            json,
            diff,
        } => {
            let ctx = Context::load(config)?;
            let mode = commands::MergeOutput::from_flags(output.as_deref(), json, diff);
            commands::run_merge(&ctx, &existing, &template, mode)
        }
        Commands::Validate { templates } => commands::run_validate(&templates),
        Commands::Stats {
            existing,
            template,
            json,
        } => commands::run_stats(&existing, &template, json),
        Commands::Apply {
            target,
            template,
            json,
        } => commands::run_apply(&Context::load(config)?, &target, &template, json),
        Commands::Check { files } => commands::run_check(&Context::load(config)?, &files),
        Commands::Forget { file } => {
            commands::run_forget(&Context::load(config)?, file.as_deref())
        }
        Commands::Completions { shell } => {
            commands::run_completions(shell);
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` applies unless `--verbose`
/// is given; the default level is `warn`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .compact();

    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
