//! Workflow
//!
//! The two-step pipeline behind every Telegram message: the agent produces a
//! reply, then the reply is delivered to the chat. Steps run in order and the
//! first failure aborts the run.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::brain::{Agent, AgentError};
use crate::telegram::{TelegramClient, TelegramError};
use crate::utils::truncate_str;

pub const STEP_AGENT: &str = "agent";
pub const STEP_SEND: &str = "send";

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Step 'agent' failed: {0}")]
    Agent(#[source] AgentError),

    #[error("Step 'send' failed: {0}")]
    Send(#[source] TelegramError),
}

impl WorkflowError {
    /// Name of the step that failed.
    pub fn step(&self) -> &'static str {
        match self {
            WorkflowError::Agent(_) => STEP_AGENT,
            WorkflowError::Send(_) => STEP_SEND,
        }
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Produces the reply text for a conversation thread.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, thread_id: &str, text: &str) -> std::result::Result<String, AgentError>;
}

/// Delivers a reply to a chat, returning the number of messages sent.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn deliver(&self, chat_id: i64, text: &str) -> std::result::Result<usize, TelegramError>;
}

#[async_trait]
impl Responder for Agent {
    async fn respond(&self, thread_id: &str, text: &str) -> std::result::Result<String, AgentError> {
        self.generate(thread_id, text).await.map(|r| r.text)
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn deliver(&self, chat_id: i64, text: &str) -> std::result::Result<usize, TelegramError> {
        self.send_message(chat_id, text).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowInput {
    pub chat_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowOutput {
    pub thread_id: String,
    pub reply: String,
    /// Telegram messages the reply was split into.
    pub parts: usize,
}

/// Memory thread for a Telegram chat.
pub fn thread_id_for(chat_id: i64) -> String {
    format!("telegram:{chat_id}")
}

#[derive(Clone)]
pub struct Workflow {
    responder: Arc<dyn Responder>,
    messenger: Arc<dyn Messenger>,
}

impl Workflow {
    pub fn new(responder: Arc<dyn Responder>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            responder,
            messenger,
        }
    }

    pub async fn run(&self, input: WorkflowInput) -> Result<WorkflowOutput> {
        let thread_id = thread_id_for(input.chat_id);
        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, chat_id = input.chat_id, "Workflow started");

        let reply = self
            .responder
            .respond(&thread_id, &input.text)
            .await
            .map_err(WorkflowError::Agent)
            .inspect_err(|e| log_failure(run_id, e))?;
        tracing::debug!(
            %run_id,
            step = STEP_AGENT,
            reply = %truncate_str(&reply, 80),
            "Step complete"
        );

        let parts = self
            .messenger
            .deliver(input.chat_id, &reply)
            .await
            .map_err(WorkflowError::Send)
            .inspect_err(|e| log_failure(run_id, e))?;

        tracing::info!(%run_id, chat_id = input.chat_id, parts, "Workflow finished");
        Ok(WorkflowOutput {
            thread_id,
            reply,
            parts,
        })
    }
}

fn log_failure(run_id: Uuid, error: &WorkflowError) {
    tracing::error!(%run_id, step = error.step(), error = %error, "Workflow step failed");
}
