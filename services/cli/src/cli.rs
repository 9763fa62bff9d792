use crate::pipeline::{run_features, run_inspect, InspectArgs, RunArgs};
use clap::{Parser, Subcommand};
use risk_features::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "risk-features",
    about = "Compute applicant risk features from embedded contract histories",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the applicant CSV and write the feature CSV (default command)
    Run(RunArgs),
    /// Compute features for a single contract-history payload and print them as JSON
    Inspect(InspectArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Run(RunArgs::default()));

    match command {
        Command::Run(args) => run_features(args),
        Command::Inspect(args) => run_inspect(args),
    }
}
