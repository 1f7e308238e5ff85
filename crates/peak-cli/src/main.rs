//! peakmerge CLI.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use peak_cli::logging::init_logging;

mod cli;
mod commands;
mod summary;
mod types;

use crate::cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Merge(args) => summary::print_summary(&commands::run_merge(&args)?),
        Command::Lookup(args) => commands::run_lookup(&args)?,
    }
    Ok(())
}
