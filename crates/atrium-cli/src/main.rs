//! # atrium CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Atrium platform CLI.
///
/// Serves the coworking-management API and prices ad-hoc quotes.
#[derive(Parser, Debug)]
#[command(name = "atrium", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server.
    Serve(atrium_cli::serve::ServeArgs),
    /// Price an ad-hoc quote offline.
    Quote(atrium_cli::quote::QuoteArgs),
    /// Generate a compliance report from a snapshot file.
    Report(atrium_cli::report::ReportArgs),
    /// Validate a service definition file.
    Validate(atrium_cli::validate::ValidateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => atrium_cli::serve::run(args).await,
        Commands::Quote(args) => atrium_cli::quote::run(args),
        Commands::Report(args) => atrium_cli::report::run(args),
        Commands::Validate(args) => atrium_cli::validate::run(args),
    }
}
