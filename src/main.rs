//! `sdkdist` command-line entry point.

use std::process::ExitCode;

use clap::Parser;
use sdkdist_cli::{cli, commands, error, logging};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    let result = match args.command {
        cli::Command::Sync => {
            logging::init_subscriber(args.verbose, args.command.log_name());
            let log = logging::Logger::new(args.command.log_name());
            let result = commands::sync::run(&args.global, &log);
            if let Err(e) = &result
                && !error::already_logged(e)
            {
                log.error(&format!("{e:#}"));
            }
            result
        }
        cli::Command::Version => {
            commands::version::run();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(error::exit_status(&e)),
    }
}
