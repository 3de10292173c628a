//! Agent error types

use crate::engine::EngineError;
use crate::session::SessionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Task cannot be empty")]
    EmptyTask,
    #[error("A new task is required when continuing from message history")]
    MissingTask,
    #[error("Message history cannot be empty")]
    EmptyHistory,
    #[error("No active conversation to continue")]
    NoActiveConversation,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl AgentError {
    /// Caller mistakes that are surfaced before any reasoning happens
    pub fn is_validation(&self) -> bool {
        match self {
            Self::EmptyTask | Self::MissingTask | Self::EmptyHistory | Self::NoActiveConversation => {
                true
            }
            Self::Session(e) => e.is_validation(),
            Self::Engine(_) => false,
        }
    }
}
