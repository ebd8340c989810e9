//! Agent
//!
//! Runs one conversational turn: replays the thread's recent history, lets the
//! model call tools until it produces a final answer, and stores the exchange.

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

use super::prompt::system_prompt;
use super::provider::{LLMRequest, Message, Provider, ProviderError, TokenUsage};
use super::tools::{ToolExecutionContext, ToolRegistry, ToolResult};
use crate::config::{AgentSettings, LlmConfig};
use crate::memory::{MemoryError, MemoryStore, MessageRole};

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM request failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Conversation memory failed: {0}")]
    Memory(#[from] MemoryError),

    #[error("Agent did not finish within {0} steps")]
    MaxStepsExceeded(usize),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

pub type Result<T> = std::result::Result<T, AgentError>;

/// Model parameters and loop bounds for a turn.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_steps: usize,
    pub history_limit: usize,
}

impl AgentOptions {
    pub fn from_config(llm: &LlmConfig, agent: &AgentSettings) -> Self {
        Self {
            model: llm.model.clone(),
            max_tokens: llm.max_tokens,
            temperature: llm.temperature,
            max_steps: agent.max_steps.max(1),
            history_limit: agent.history_limit,
        }
    }
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            model: "openai/gpt-4o-mini".to_string(),
            max_tokens: 1024,
            temperature: 0.3,
            max_steps: 5,
            history_limit: 20,
        }
    }
}

/// Result of a completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResponse {
    pub text: String,
    /// Model calls made, including the final one.
    pub steps: usize,
    pub usage: TokenUsage,
    pub cost_usd: f64,
}

#[derive(Clone)]
pub struct Agent {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    memory: MemoryStore,
    options: AgentOptions,
}

impl Agent {
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        memory: MemoryStore,
        options: AgentOptions,
    ) -> Self {
        Self {
            provider,
            tools,
            memory,
            options,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Answers `text` in the context of `thread_id`.
    pub async fn generate(&self, thread_id: &str, text: &str) -> Result<AgentResponse> {
        self.memory.ensure_thread(thread_id).await?;
        let history = self
            .memory
            .recent(thread_id, self.options.history_limit)
            .await?;

        let mut messages: Vec<Message> = history
            .into_iter()
            .map(|m| match m.role {
                MessageRole::User => Message::user(m.content),
                MessageRole::Assistant => Message::assistant(m.content),
            })
            .collect();
        messages.push(Message::user(text));
        self.memory
            .append(thread_id, MessageRole::User, text)
            .await?;

        let tools = if self.provider.supports_tools() {
            self.tools.definitions()
        } else {
            Vec::new()
        };
        let system = system_prompt(Utc::now());
        let context = ToolExecutionContext::new(thread_id);
        let mut usage = TokenUsage::default();

        for step in 1..=self.options.max_steps {
            let request = LLMRequest::new(self.options.model.clone(), messages.clone())
                .with_system(system.clone())
                .with_tools(tools.clone())
                .with_max_tokens(self.options.max_tokens)
                .with_temperature(self.options.temperature);

            let response = self.provider.complete(request).await?;
            usage.add(response.usage);
            tracing::debug!(
                thread = thread_id,
                step,
                tool_calls = response.tool_calls.len(),
                stop_reason = ?response.stop_reason,
                "Model step complete"
            );

            if response.tool_calls.is_empty() {
                let reply = response
                    .text
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .ok_or(AgentError::EmptyResponse)?;

                self.memory
                    .append(thread_id, MessageRole::Assistant, &reply)
                    .await?;

                let cost_usd = self.provider.calculate_cost(
                    &response.model,
                    usage.input_tokens,
                    usage.output_tokens,
                );
                tracing::info!(
                    thread = thread_id,
                    provider = self.provider.name(),
                    model = %response.model,
                    steps = step,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    cost_usd,
                    "Agent turn complete"
                );

                return Ok(AgentResponse {
                    text: reply,
                    steps: step,
                    usage,
                    cost_usd,
                });
            }

            let calls = response.tool_calls;
            messages.push(Message::assistant_with_tools(
                response.text.unwrap_or_default(),
                calls.clone(),
            ));

            for call in calls {
                let result = match self
                    .tools
                    .execute(&call.name, call.arguments.clone(), &context)
                    .await
                {
                    Ok(result) => result,
                    Err(e) => {
                        tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
                        ToolResult::error(e.to_string())
                    }
                };
                messages.push(Message::tool_result(call.id, result.to_model_content()));
            }
        }

        tracing::warn!(
            thread = thread_id,
            max_steps = self.options.max_steps,
            "Agent hit the step limit"
        );
        Err(AgentError::MaxStepsExceeded(self.options.max_steps))
    }
}
