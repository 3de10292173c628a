//! Mock implementations for testing
//!
//! These mocks let the agent and engine be exercised without a real model.

use crate::engine::{Engine, EngineConfig, EngineError, EngineFactory, Toolchain};
use crate::llm::{LlmClient, LlmError, LlmRequest, LlmResponse, ToolDefinition};
use crate::session::Session;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Rejected("No mock response queued".to_string())))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Mock Toolchain
// ============================================================================

/// Toolchain with named placeholder tools
#[derive(Default)]
pub struct MockToolchain {
    definitions: Vec<ToolDefinition>,
}

impl MockToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.definitions.push(ToolDefinition {
            description: format!("Mock {name}"),
            name,
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        });
        self
    }
}

impl Toolchain for MockToolchain {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.definitions.clone()
    }
}

// ============================================================================
// Recording Engine Factory
// ============================================================================

/// What a recorded engine saw when it ran
#[derive(Debug, Clone)]
pub struct EngineCall {
    pub session_id: String,
    pub task: String,
    pub session_active: bool,
    pub messages_before: usize,
    pub max_iterations: u32,
}

/// Engine that echoes the task or fails, recording every call
struct RecordingEngine {
    config: EngineConfig,
    fail: bool,
    calls: Arc<Mutex<Vec<EngineCall>>>,
}

#[async_trait]
impl Engine for RecordingEngine {
    async fn reason(&mut self, session: &mut Session, task: &str) -> Result<String, EngineError> {
        self.calls.lock().unwrap().push(EngineCall {
            session_id: session.id().to_string(),
            task: task.to_string(),
            session_active: session.is_active(),
            messages_before: session.messages().len(),
            max_iterations: self.config.max_iterations,
        });
        session.add_user_message(task)?;
        if self.fail {
            return Err(EngineError::Other("engine exploded".to_string()));
        }
        let answer = format!("echo: {task}");
        session.add_assistant_message(&answer)?;
        Ok(answer)
    }
}

/// Factory for engines that echo tasks (or fail) and record each call
#[derive(Default, Clone)]
pub struct RecordingEngineFactory {
    fail: bool,
    calls: Arc<Mutex<Vec<EngineCall>>>,
}

impl RecordingEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl EngineFactory for RecordingEngineFactory {
    fn create(&self, config: EngineConfig) -> Box<dyn Engine> {
        Box::new(RecordingEngine {
            config,
            fail: self.fail,
            calls: Arc::clone(&self.calls),
        })
    }
}

// ============================================================================
// Pending Engine Factory
// ============================================================================

/// Engine that records the task and then never finishes
struct PendingEngine;

#[async_trait]
impl Engine for PendingEngine {
    async fn reason(&mut self, session: &mut Session, task: &str) -> Result<String, EngineError> {
        session.add_user_message(task)?;
        std::future::pending::<()>().await;
        Ok(String::new())
    }
}

/// Factory for engines whose calls only end when the caller drops them
#[derive(Default, Clone, Copy)]
pub struct PendingEngineFactory;

impl EngineFactory for PendingEngineFactory {
    fn create(&self, _config: EngineConfig) -> Box<dyn Engine> {
        Box::new(PendingEngine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_llm_client() {
        let mock = MockLlmClient::new("test-model");
        mock.queue_response(LlmResponse::text("Hello"));

        let request = LlmRequest {
            system: String::new(),
            messages: vec![],
            tools: vec![],
            max_tokens: Some(100),
        };

        let response = mock.complete(&request).await.unwrap();
        assert_eq!(response.content, "Hello");

        // Second call should fail (no more responses)
        let result = mock.complete(&request).await;
        assert!(result.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    #[test]
    fn test_mock_toolchain() {
        let tools = MockToolchain::new().with_tool("bash").with_tool("search");
        let names: Vec<_> = tools.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["bash", "search"]);
    }
}
