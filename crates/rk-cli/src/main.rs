//! Reckon CLI - build and reconcile daily revenue marts on DuckDB

use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{build, init, load, report, status};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        cli::Commands::Init(args) => init::execute(args).await,
        cli::Commands::Load(args) => load::execute(args, &cli.global).await,
        cli::Commands::Build(args) => build::execute(args, &cli.global).await,
        cli::Commands::Status(args) => status::execute(args, &cli.global).await,
        cli::Commands::Report(args) => report::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        // ExitCode carries a bare exit status for failures the command has
        // already reported; everything else gets the anyhow context chain.
        if let Some(code) = err.downcast_ref::<ExitCode>() {
            std::process::exit(code.0);
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
