//! Model invocation failures

use thiserror::Error;

/// Why a model call produced no reply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    /// Timeouts, rate limits, provider outages. Another attempt may succeed.
    #[error("Model unavailable: {0}")]
    Unavailable(String),
    /// Bad credentials or a request the provider will never accept
    #[error("Model rejected request: {0}")]
    Rejected(String),
}

impl LlmError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
