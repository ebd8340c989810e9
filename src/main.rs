use anyhow::{Context, Result};
use clap::Parser;

use stargazer::cli::{self, Cli};
use stargazer::config::AppConfig;
use stargazer::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let _log_guard = logging::init(&config.logging)?;

    tracing::debug!("stargazer v{}", stargazer::VERSION);
    cli::run(cli, config).await
}
