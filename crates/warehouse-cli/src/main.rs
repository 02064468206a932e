//! `warehouse-etl`: travel records to a Parquet warehouse.

use std::process::ExitCode;

use clap::Parser;
use warehouse_cli::logging::init_logging;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command};
use crate::commands::{run_etl, run_tables};
use crate::summary::print_summary;

/// Configuration or startup failure, before any unit ran.
const EXIT_SETUP: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&cli.log_config()) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::from(EXIT_SETUP);
    }
    match &cli.command {
        Command::Run(args) => match run_etl(args) {
            Ok(result) => {
                print_summary(&result);
                if result.has_errors() {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(EXIT_SETUP)
            }
        },
        Command::Tables(args) => match run_tables(args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::FAILURE
            }
        },
    }
}
