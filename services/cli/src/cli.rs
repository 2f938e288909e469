use crate::{list_keys, run_simulation, RunArgs};
use clap::{Parser, Subcommand};
use shelf_life::error::AppError;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "shelf-life",
    about = "Simulate how quality, price and shelf removal of a shop inventory evolve day by day",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the simulation (default command)
    Run(RunArgs),
    /// List the registered rule implementations and loader keys
    Keys,
}

pub(crate) fn run() -> Result<ExitCode, AppError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Run(args)) => run_simulation(args),
        Some(Command::Keys) => list_keys(),
        None => run_simulation(cli.run),
    }
}
