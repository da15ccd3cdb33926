use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "procflow")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Check, execute and revert procedures described in TOML manifests",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a procedure: check, execute, and revert on failure
    Run(RunArgs),

    /// Run only the checks of a procedure
    Check(RunArgs),

    /// Inspect resolved parameters
    #[command(subcommand)]
    Params(ParamsCommand),

    /// List built-in process kinds
    Kinds,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct RunArgs {
    /// Procedure manifest (TOML)
    pub manifest: PathBuf,

    /// What the procedure operates on, e.g. assets~character/hero/modeling
    #[arg(short, long, default_value = "")]
    pub arg: String,

    /// Run name (defaults to the manifest name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Input argument as key=value (repeatable; JSON values allowed)
    #[arg(short, long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Extra parameter file layered over the project parameters
    #[arg(short, long, env = "PROCFLOW_PARAMS")]
    pub params: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ParamsCommand {
    /// Print one parameter by dotted key
    Get {
        /// Dotted key, e.g. project.name
        key: String,

        /// Extra parameter file layered over the project parameters
        #[arg(short, long, env = "PROCFLOW_PARAMS")]
        params: Option<PathBuf>,
    },

    /// List every parameter and where they were loaded from
    List {
        /// Extra parameter file layered over the project parameters
        #[arg(short, long, env = "PROCFLOW_PARAMS")]
        params: Option<PathBuf>,
    },
}
