//! Application configuration

use clap::Args;

pub mod booking;
pub mod observability;

pub use booking::{ConfigError, PolicyConfig, PricingConfig};
pub use observability::{LogFormat, LoggingConfig};

/// Default fixtures directory, relative to the working directory.
pub const DEFAULT_FIXTURES_DIR: &str = "./fixtures";

/// Atelier configuration, read from CLI arguments with environment fallbacks.
#[derive(Debug, Args)]
pub struct AppConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Invoice pricing settings.
    #[command(flatten)]
    pub pricing: PricingConfig,

    /// Cancellation window settings.
    #[command(flatten)]
    pub policy: PolicyConfig,

    /// Directory holding `quotes/*.yml`
    #[arg(long, env = "FIXTURES_DIR", default_value = DEFAULT_FIXTURES_DIR, global = true)]
    pub fixtures_dir: String,
}
