use clap::Parser;
use outbreak_processor::cli::{args::Args, commands};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(()) => {
            // Success - summaries have already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            // anyhow renders the full source chain, not just the top message
            eprintln!("Error: {:#}", anyhow::Error::from(error));
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Outbreak Processor - Animal-Disease Surveillance Ingestion");
    println!("==========================================================");
    println!();
    println!("Ingest surveillance CSV exports into normalized, geocoded case");
    println!("records with duplicate-safe loading and a JSON audit trail.");
    println!();
    println!("USAGE:");
    println!("    outbreak-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    ingest      Run the full ingestion pipeline (main command)");
    println!("    check       Parse, geocode, and validate without loading");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Ingest every dataset from the default data directory:");
    println!("    outbreak-processor ingest");
    println!();
    println!("    # Ingest specific datasets with explicit paths:");
    println!("    outbreak-processor ingest --input ./datasets/raw --output ./datasets/processed \\");
    println!("                              --places ./lookups/places.csv --datasets commercial,mammal");
    println!();
    println!("    # Validate a new export without loading it:");
    println!("    outbreak-processor check --input ./datasets/raw --datasets wild_bird");
    println!();
    println!("For detailed help on any command, use:");
    println!("    outbreak-processor <COMMAND> --help");
}
