//! Reasoning engine seam
//!
//! The engine turns a task into an answer, appending messages and spans to
//! the session it is handed. The agent builds one engine per call from an
//! [`EngineConfig`] and never touches message content itself.

mod answer;

pub use answer::{AnswerEngine, AnswerEngineFactory, CONTINUE_PROMPT};

use crate::llm::{LlmClient, LlmError, ToolDefinition};
use crate::session::{Session, SessionError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Tool set handed through to the engine untouched
pub trait Toolchain: Send + Sync {
    /// Get tool definitions for LLM
    fn definitions(&self) -> Vec<ToolDefinition>;
}

/// Toolchain with no tools
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTools;

impl Toolchain for NoTools {
    fn definitions(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }
}

/// Per-call construction inputs for an engine
#[derive(Clone)]
pub struct EngineConfig {
    /// Agent context / system prompt
    pub context: String,
    pub model: Arc<dyn LlmClient>,
    pub tools: Arc<dyn Toolchain>,
    /// Session the engine is bound to for this call
    pub session_id: String,
    pub max_iterations: u32,
}

/// Errors that can occur while reasoning
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Model request failed: {0}")]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("No answer after {0} iterations")]
    MaxIterations(u32),
    #[error("{0}")]
    Other(String),
}

/// Reasoning loop bound to one session for one call
#[async_trait]
pub trait Engine: Send {
    /// Reason about `task`, mutating `session` as a side effect
    async fn reason(&mut self, session: &mut Session, task: &str) -> Result<String, EngineError>;
}

/// Builds a fresh engine for every agent call
pub trait EngineFactory: Send + Sync {
    fn create(&self, config: EngineConfig) -> Box<dyn Engine>;
}
