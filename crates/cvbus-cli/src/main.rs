//! cvbus CLI - Command-line interface for the cvbus CV routing engine.

mod commands;
mod patch;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cvbus")]
#[command(author, version, about = "cvbus CV routing engine CLI", long_about = None)]
struct Cli {
    /// Log routing edits and link resolution (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an engine settings file
    Check(commands::check::CheckArgs),

    /// Render a small demo patch and print what the targets receive
    Demo(commands::demo::DemoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check(args) => commands::check::run(args),
        Commands::Demo(args) => commands::demo::run(args),
    }
}
