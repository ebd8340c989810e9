//! Configuration Module
//!
//! Settings are layered with the `config` crate: compiled defaults, then an
//! optional TOML file (`~/.stargazer/config.toml` or `--config`), then
//! `STARGAZER__SECTION__KEY` environment overrides, then the well-known
//! deployment variables `TELEGRAM_BOT_TOKEN`, `OPENROUTER_API_KEY` and `PORT`.

mod secret;

pub use secret::Secret;

use ::config::{Config, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_PREFIX: &str = "STARGAZER";
pub const DEFAULT_LOG_FILTER: &str = "stargazer=info,tower_http=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("PORT must be a number between 1 and 65535, got {0:?}")]
    InvalidPort(String),

    #[error("{0} is not configured")]
    Missing(&'static str),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// ── Sections ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub telegram: TelegramConfig,
    pub llm: LlmConfig,
    pub agent: AgentSettings,
    pub memory: MemoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<Secret>,
    /// Expected `X-Telegram-Bot-Api-Secret-Token` on webhook calls.
    #[serde(default)]
    pub webhook_secret: Option<Secret>,
    pub api_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: Option<Secret>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    pub max_steps: usize,
    /// Stored messages replayed to the model on each turn.
    pub history_limit: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    pub in_memory: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
    /// Also write a daily rolling file under `directory`.
    pub file: bool,
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl TelegramConfig {
    pub fn token(&self) -> Option<&Secret> {
        self.bot_token.as_ref().filter(|s| !s.is_empty())
    }

    pub fn require_token(&self) -> Result<&Secret> {
        self.token().ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))
    }
}

impl LlmConfig {
    pub fn key(&self) -> Option<&Secret> {
        self.api_key.as_ref().filter(|s| !s.is_empty())
    }
}

impl MemoryConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| stargazer_home().join("stargazer.db"))
    }
}

impl LoggingConfig {
    pub fn resolved_directory(&self) -> PathBuf {
        self.directory
            .clone()
            .unwrap_or_else(|| stargazer_home().join("logs"))
    }
}

// ── Loading ──────────────────────────────────────────────────────

impl AppConfig {
    /// Loads from the process environment and `path` (or the default file).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, std::env::vars().collect())
    }

    /// Loads from an explicit environment map, used directly by tests.
    pub fn load_from(path: Option<&Path>, env: HashMap<String, String>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("telegram.api_base_url", "https://api.telegram.org")?
            .set_default("llm.base_url", "https://openrouter.ai/api/v1")?
            .set_default("llm.model", "openai/gpt-4o-mini")?
            .set_default("llm.max_tokens", 1024_i64)?
            .set_default("llm.temperature", 0.3_f64)?
            .set_default("llm.timeout_secs", 60_i64)?
            .set_default("agent.max_steps", 5_i64)?
            .set_default("agent.history_limit", 20_i64)?
            .set_default("memory.in_memory", false)?
            .set_default("logging.filter", DEFAULT_LOG_FILTER)?
            .set_default("logging.json", false)?
            .set_default("logging.file", false)?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::from(stargazer_home().join("config.toml")).required(false)),
        };

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .source(Some(env.clone().into_iter().collect())),
        );

        if let Some(token) = non_empty(&env, "TELEGRAM_BOT_TOKEN") {
            builder = builder.set_override("telegram.bot_token", token)?;
        }
        if let Some(key) = non_empty(&env, "OPENROUTER_API_KEY") {
            builder = builder.set_override("llm.api_key", key)?;
        }
        if let Some(port) = non_empty(&env, "PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| ConfigError::InvalidPort(port.to_string()))?;
            builder = builder.set_override("server.port", i64::from(port))?;
        }

        let config: AppConfig = builder.build()?.try_deserialize()?;
        tracing::debug!(
            port = config.server.port,
            model = %config.llm.model,
            telegram = config.telegram.token().is_some(),
            llm = config.llm.key().is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }
}

fn non_empty<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key).map(String::as_str).filter(|v| !v.trim().is_empty())
}

/// Base directory for config, database and logs: `~/.stargazer/`.
pub fn stargazer_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".stargazer")
}
