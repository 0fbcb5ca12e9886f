use atelier_app::{config::AppConfig, observability};
use clap::{Parser, Subcommand};

mod cancellation;
mod quote;

#[derive(Debug, Parser)]
#[command(name = "atelier", about = "Atelier booking engine CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Price a quote fixture
    Quote(quote::QuoteArgs),

    /// Check whether a fixture's booking can be cancelled
    Cancellation(cancellation::CancellationArgs),
}

impl Cli {
    pub(crate) fn run(self) -> Result<(), String> {
        observability::init(&self.config.logging)
            .map_err(|error| format!("failed to initialise logging: {error}"))?;

        match self.command {
            Commands::Quote(args) => quote::run(args, &self.config),
            Commands::Cancellation(args) => cancellation::run(args, &self.config),
        }
    }
}
