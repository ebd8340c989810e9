//! Brain Module
//!
//! The conversational side of the bot: LLM providers, the tools the model may
//! call, the system prompt and the agent loop tying them together.

pub mod agent;
pub mod prompt;
pub mod provider;
pub mod tools;

pub use agent::{Agent, AgentError, AgentOptions, AgentResponse};
pub use provider::{OpenAiCompatibleProvider, PlaceholderProvider, Provider};
pub use tools::{CelestialVisibilityTool, Tool, ToolRegistry};
