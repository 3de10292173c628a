//! LLM client abstraction
//!
//! The model is an external collaborator; this crate only defines the seam
//! it is called through and a metering decorator the agent installs.

mod error;
mod types;

pub use error::LlmError;
pub use types::*;

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Client for making LLM requests
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Complete an LLM request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Accumulates token usage over every call an agent makes
pub struct MeteredClient {
    inner: Arc<dyn LlmClient>,
    calls: AtomicU64,
    failures: AtomicU64,
    input_tokens: AtomicU64,
    output_tokens: AtomicU64,
}

impl MeteredClient {
    pub fn new(inner: Arc<dyn LlmClient>) -> Self {
        Self {
            inner,
            calls: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            input_tokens: AtomicU64::new(0),
            output_tokens: AtomicU64::new(0),
        }
    }

    /// Tokens consumed by successful calls so far
    pub fn usage(&self) -> Usage {
        Usage {
            input_tokens: self.input_tokens.load(Ordering::Relaxed),
            output_tokens: self.output_tokens.load(Ordering::Relaxed),
        }
    }

    /// (calls made, calls that failed)
    pub fn call_counts(&self) -> (u64, u64) {
        (
            self.calls.load(Ordering::Relaxed),
            self.failures.load(Ordering::Relaxed),
        )
    }
}

#[async_trait]
impl LlmClient for MeteredClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        let result = self.inner.complete(request).await;

        match &result {
            Ok(response) => {
                self.input_tokens
                    .fetch_add(response.usage.input_tokens, Ordering::Relaxed);
                self.output_tokens
                    .fetch_add(response.usage.output_tokens, Ordering::Relaxed);
                tracing::debug!(
                    model = %self.inner.model_id(),
                    call,
                    history = request.messages.len(),
                    tokens = response.usage.total(),
                    "Model call metered"
                );
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    model = %self.inner.model_id(),
                    call,
                    history = request.messages.len(),
                    transient = e.is_transient(),
                    error = %e,
                    "Model call failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}
