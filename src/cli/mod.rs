use crate::errors::AppResult;
use clap::{Parser, Subcommand};

pub mod commands;

/// Bitcoin coinbase marker scanner
#[derive(Parser)]
#[command(name = "sys-marker-scan")]
#[command(about = "Find recent Bitcoin blocks carrying the \"sys\" marker and attribute their mining pools")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the most recent marker blocks as JSON
    Top8(commands::top8::Top8Command),
    /// Stream snapshot/update events as new blocks arrive
    Watch(commands::watch::WatchCommand),
    /// Decode an OP_RETURN script and test it for the marker
    DecodeScript(commands::decode::DecodeScriptCommand),
    /// Test Esplora provider connectivity
    TestProviders(commands::test_providers::TestProvidersCommand),
}

pub async fn run() -> AppResult<()> {
    // Initialise tracing subscriber to capture info!() macros
    // Uses RUST_LOG environment variable (defaults to "error" if not set)
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("error")),
        )
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Top8(command) => command.run().await,
        Commands::Watch(command) => command.run().await,
        Commands::DecodeScript(command) => command.run().await,
        Commands::TestProviders(command) => command.run().await,
    }
}
