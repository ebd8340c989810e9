//! Command-line interface.

mod serve;
mod visibility;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{AppConfig, Secret};
use crate::telegram::TelegramClient;

pub use serve::build_state;
pub use visibility::render_report;

/// Stargazer - which planets are up in your sky
#[derive(Parser, Debug)]
#[command(name = "stargazer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true, env = "STARGAZER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the webhook gateway
    Serve {
        /// Port to listen on (overrides PORT and the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print which bodies are visible from a location
    #[command(allow_negative_numbers = true)]
    Visibility {
        /// Latitude in degrees, north positive
        #[arg(long)]
        lat: f64,

        /// Longitude in degrees, east positive
        #[arg(long)]
        lon: f64,

        /// Meters above sea level
        #[arg(long, default_value_t = 0.0)]
        elevation: f64,

        /// RFC 3339 instant (default: now)
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        /// Print the raw JSON report
        #[arg(long)]
        json: bool,
    },

    /// Register the Telegram webhook URL
    SetWebhook {
        /// Public HTTPS URL of `/webhook/telegram`
        #[arg(long)]
        url: String,

        /// Secret token Telegram must echo back (default: telegram.webhook_secret)
        #[arg(long)]
        secret: Option<String>,
    },
}

/// Runs a parsed command with loaded configuration.
pub async fn run(cli: Cli, mut config: AppConfig) -> Result<()> {
    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            serve::serve(config).await
        }
        Commands::Visibility {
            lat,
            lon,
            elevation,
            at,
            json,
        } => visibility::print_visibility(lat, lon, elevation, at, json).await,
        Commands::SetWebhook { url, secret } => {
            let token = config.telegram.require_token()?;
            let client = TelegramClient::new(Some(token), &config.telegram.api_base_url)?;
            let secret = secret
                .map(Secret::from)
                .or_else(|| config.telegram.webhook_secret.clone());
            client
                .set_webhook(&url, secret.as_ref())
                .await
                .context("Failed to register webhook")?;
            println!("Webhook set to {url}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_visibility_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "stargazer",
            "visibility",
            "--lat",
            "-33.87",
            "--lon",
            "-70.5",
            "--at",
            "2024-01-25T15:00:00Z",
            "--json",
        ])
        .expect("parses");

        assert!(matches!(cli.command, Commands::Visibility { json: true, .. }));
        if let Commands::Visibility { lat, lon, at, .. } = cli.command {
            assert_eq!(lat, -33.87);
            assert_eq!(lon, -70.5);
            assert_eq!(
                at.map(|t| t.to_rfc3339()).as_deref(),
                Some("2024-01-25T15:00:00+00:00")
            );
        }
    }

    #[test]
    fn test_parse_serve_and_webhook() {
        let cli = Cli::try_parse_from(["stargazer", "serve", "--port", "9000"]).expect("parses");
        assert!(matches!(cli.command, Commands::Serve { port: Some(9000) }));

        let cli = Cli::try_parse_from([
            "stargazer",
            "--config",
            "/etc/stargazer.toml",
            "set-webhook",
            "--url",
            "https://bot.example.com/webhook/telegram",
        ])
        .expect("parses");
        assert_eq!(cli.config, Some(PathBuf::from("/etc/stargazer.toml")));
        assert!(matches!(cli.command, Commands::SetWebhook { secret: None, .. }));
    }

    #[test]
    fn test_rejects_missing_coordinates() {
        assert!(Cli::try_parse_from(["stargazer", "visibility", "--lat", "10"]).is_err());
    }
}
