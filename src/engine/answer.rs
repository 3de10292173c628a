//! Reference engine: ask the model until it replies with an `Answer:` line

use super::{Engine, EngineConfig, EngineError, EngineFactory};
use crate::llm::LlmRequest;
use crate::session::{Session, SpanKind};
use async_trait::async_trait;
use serde_json::{json, Value};

const ANSWER_MARKER: &str = "Answer:";

/// User turn appended after a reply that carries no answer
pub const CONTINUE_PROMPT: &str = "Continue. When you are done, reply with a line starting with 'Answer:'.";

/// Engine that loops model calls until one carries an answer marker
pub struct AnswerEngine {
    config: EngineConfig,
    max_tokens: Option<u32>,
}

impl AnswerEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            max_tokens: None,
        }
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn request(&self, session: &Session) -> LlmRequest {
        LlmRequest {
            system: self.config.context.clone(),
            messages: session.messages().to_vec(),
            tools: self.config.tools.definitions(),
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl Engine for AnswerEngine {
    async fn reason(&mut self, session: &mut Session, task: &str) -> Result<String, EngineError> {
        session.add_user_message(task)?;
        let mut last_failure = None;

        for iteration in 1..=self.config.max_iterations {
            let request = self.request(session);
            let response = match self.config.model.complete(&request).await {
                Ok(response) => response,
                // A transient failure spends the iteration; the next one asks again
                Err(e) if e.is_transient() => {
                    tracing::warn!(
                        session_id = %self.config.session_id,
                        iteration,
                        error = %e,
                        "Model unavailable, retrying"
                    );
                    last_failure = Some(e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            last_failure = None;
            tracing::debug!(
                session_id = %self.config.session_id,
                iteration,
                tokens = response.usage.total(),
                "Model replied"
            );

            let blank = response.content.trim().is_empty();
            if !blank {
                session.add_assistant_message(&response.content)?;
            }
            let arguments = json!({
                "reply": response.content,
                "iteration": iteration,
                "usage": response.usage,
            });

            if response.content.contains(ANSWER_MARKER) {
                let output = session.exec(SpanKind::Answer, arguments, extract_answer)?;
                return Ok(match output {
                    Value::String(answer) => answer,
                    other => other.to_string(),
                });
            }

            session.exec(SpanKind::Reason, arguments, extract_thought)?;
            session.add_user_message(CONTINUE_PROMPT)?;
        }

        Err(last_failure.map_or(
            EngineError::MaxIterations(self.config.max_iterations),
            EngineError::Llm,
        ))
    }
}

/// Text after the last answer marker, trimmed
fn extract_answer(arguments: &Value) -> Value {
    let reply = arguments["reply"].as_str().unwrap_or_default();
    let answer = reply
        .rsplit_once(ANSWER_MARKER)
        .map_or(reply, |(_, after)| after);
    Value::String(answer.trim().to_string())
}

fn extract_thought(arguments: &Value) -> Value {
    Value::String(arguments["reply"].as_str().unwrap_or_default().trim().to_string())
}

/// Factory producing an [`AnswerEngine`] per call
#[derive(Debug, Clone, Copy, Default)]
pub struct AnswerEngineFactory {
    pub max_tokens: Option<u32>,
}

impl EngineFactory for AnswerEngineFactory {
    fn create(&self, config: EngineConfig) -> Box<dyn Engine> {
        let engine = AnswerEngine::new(config);
        match self.max_tokens {
            Some(max_tokens) => Box::new(engine.with_max_tokens(max_tokens)),
            None => Box::new(engine),
        }
    }
}
