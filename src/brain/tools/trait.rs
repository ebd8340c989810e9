//! The interface every agent tool implements.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::error::Result;
use crate::brain::provider::ToolDefinition;

/// Per-call context handed to tools.
#[derive(Debug, Clone)]
pub struct ToolExecutionContext {
    /// Conversation the call belongs to.
    pub thread_id: String,
}

impl ToolExecutionContext {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
        }
    }
}

/// Outcome reported back to the model.
///
/// A failed result is still a successful call from the agent's point of view:
/// the error text goes back to the model so it can correct itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
}

impl ToolResult {
    pub fn success(output: String) -> Self {
        Self {
            success: true,
            output,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            output: message,
        }
    }

    /// Text placed in the tool message sent to the model.
    pub fn to_model_content(&self) -> String {
        if self.success {
            self.output.clone()
        } else {
            format!("Error: {}", self.output)
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema of the `input` object.
    fn input_schema(&self) -> Value;

    async fn execute(&self, input: Value, context: &ToolExecutionContext) -> Result<ToolResult>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}
