//! CLI command dispatch

use crate::cli::args::{Args, Commands};
use crate::{Error, Result};

pub mod check;
pub mod ingest;
pub mod shared;

/// Run the parsed CLI command
pub fn run(args: Args) -> Result<()> {
    match args.command {
        Some(Commands::Ingest(ingest_args)) => ingest::run_ingest(ingest_args),
        Some(Commands::Check(check_args)) => check::run_check(check_args),
        None => Err(Error::configuration("no command provided")),
    }
}
