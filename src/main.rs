mod arg;
mod cli;
mod commands;
mod environment;
mod manifest;
mod params;
mod paths;
mod processes;
mod runner;
mod template;
mod ui;
mod version;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };
    log::trace!("procflow started (verbosity {})", ctx.verbose);

    match cli.command {
        Command::Run(args) => commands::run::run(&ctx, args),
        Command::Check(args) => commands::check::run(&ctx, args),
        Command::Params(cmd) => commands::params::run(&ctx, cmd),
        Command::Kinds => {
            commands::kinds::run();
            Ok(())
        }
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "procflow", &mut io::stdout());
            Ok(())
        }
    }
}
