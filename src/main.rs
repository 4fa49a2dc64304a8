mod agent;
mod answer;
mod cli;
mod commands;
mod model;
mod pdf;
mod semantic;
mod store;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let location = &cli.location;

    match cli.command.unwrap_or(Commands::Ask) {
        Commands::Ask => commands::ask::run(location),
        Commands::Ingest(args) => commands::ingest::run(location, args),
        Commands::Query(args) => commands::query::run(location, args),
        Commands::Status => commands::status::run(location),
        Commands::Agent => commands::agent::describe(),
        Commands::ToolCall(args) => commands::agent::tool_call(location, args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
