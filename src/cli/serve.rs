//! `stargazer serve`: wires configuration into the gateway.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::astronomy::VisibilityCalculator;
use crate::brain::{
    Agent, AgentOptions, CelestialVisibilityTool, OpenAiCompatibleProvider, PlaceholderProvider,
    Provider, ToolRegistry,
};
use crate::config::AppConfig;
use crate::gateway::{AppState, GatewayParams, start_server};
use crate::memory::MemoryStore;
use crate::telegram::TelegramClient;
use crate::workflow::Workflow;

fn build_provider(config: &AppConfig) -> Result<Arc<dyn Provider>> {
    match config.llm.key() {
        Some(key) => {
            let provider = OpenAiCompatibleProvider::new(
                config.llm.base_url.clone(),
                key.clone(),
                config.llm.model.clone(),
                Duration::from_secs(config.llm.timeout_secs),
            )
            .context("Failed to create LLM provider")?;
            tracing::info!(model = %config.llm.model, base_url = %config.llm.base_url, "LLM provider ready");
            Ok(Arc::new(provider))
        }
        None => {
            tracing::warn!("OPENROUTER_API_KEY is not set; chat replies are disabled");
            Ok(Arc::new(PlaceholderProvider))
        }
    }
}

async fn open_memory(config: &AppConfig) -> Result<MemoryStore> {
    if config.memory.in_memory {
        tracing::info!("Using in-memory conversation store");
        return MemoryStore::open_in_memory()
            .await
            .context("Failed to open in-memory database");
    }
    let path = config.memory.resolved_path();
    MemoryStore::open(&path)
        .await
        .with_context(|| format!("Failed to open database at {}", path.display()))
}

/// Builds the shared gateway state from configuration.
pub async fn build_state(config: &AppConfig) -> Result<AppState> {
    let calculator = Arc::new(VisibilityCalculator::new());

    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(CelestialVisibilityTool::new(Arc::clone(&calculator))));

    let memory = open_memory(config).await?;
    let agent = Agent::new(
        build_provider(config)?,
        Arc::new(tools),
        memory,
        AgentOptions::from_config(&config.llm, &config.agent),
    );
    tracing::debug!(provider = agent.provider_name(), "Agent ready");

    let telegram = TelegramClient::new(config.telegram.token(), &config.telegram.api_base_url)
        .context("Failed to create Telegram client")?;
    if !telegram.is_configured() {
        tracing::warn!("TELEGRAM_BOT_TOKEN is not set; webhook replies will fail");
    }

    Ok(AppState {
        workflow: Workflow::new(Arc::new(agent), Arc::new(telegram)),
        calculator,
        webhook_secret: config.telegram.webhook_secret.clone().filter(|s| !s.is_empty()),
    })
}

pub async fn serve(config: AppConfig) -> Result<()> {
    let state = build_state(&config).await?;
    let params = GatewayParams {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    start_server(state, &params).await
}
