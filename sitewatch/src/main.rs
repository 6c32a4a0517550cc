//! sitewatch entry point

use clap::Parser;
use sitewatch::cli::{Cli, Commands};
use sitewatch::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init() {
        eprintln!("Error: failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Some(Commands::Run(args)) => sitewatch::cli::run::execute(&args).await.map(|_| ()),
        Some(Commands::Check(args)) => sitewatch::cli::check::execute(&args).await.map(|_| ()),
        Some(Commands::Prompt(args)) => sitewatch::cli::prompt::execute(&args),
        // No subcommand - default to run
        None => sitewatch::cli::run::execute(&cli.run).await.map(|_| ()),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
