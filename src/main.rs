//! toolprovider - install and activate declared tool versions
//!
//! Reads a tool configuration, resolves every declaration to a concrete
//! version through asdf or mise, installs what is missing and prints the
//! environment that activates the result.

use clap::Parser;
use std::io::{self, Write};
use std::process::ExitCode;
use toolprovider::cli::CliArgs;
use toolprovider::logging::{default_level, init_tracing};
use toolprovider::orchestrator::Orchestrator;
use toolprovider::output::{create_formatter, OutputConfig};

fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Err(e) = init_tracing(args.log_format, default_level(args.verbose, args.quiet)) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(args) {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    if args.verbose {
        eprintln!("toolprovider v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("Config: {}", args.config.display());
    }

    let orchestrator = Orchestrator::from_cli(&args)?;
    let result = orchestrator.run();

    let formatter = create_formatter(OutputConfig::from_cli(args.json, args.verbose, args.quiet));
    let mut stdout = io::stdout().lock();
    formatter.format(&result, &mut stdout)?;
    stdout.flush()?;

    match &result.error {
        Some(error) => {
            if !args.json {
                eprintln!("Error: {}", error);
            }
            Ok(ExitCode::FAILURE)
        }
        None => Ok(ExitCode::SUCCESS),
    }
}
