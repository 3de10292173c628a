//! Conversation session
//!
//! An append-only log of messages and execution spans with a simple
//! start/end lifecycle:
//!
//! ```text
//! unstarted --start/reactivate--> active --complete--> completed
//!                                   ^                      |
//!                                   +------reactivate------+
//! ```
//!
//! No transition discards messages or spans. A session is not safe for
//! concurrent mutation; callers serialize access per conversation.

mod error;
mod export;
mod message;
mod span;

#[cfg(test)]
mod proptests;

pub use error::SessionError;
pub use export::ExportedMessage;
pub use message::{validate_message_format, Message, Role};
pub use span::{Span, SpanBody, SpanKind};

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

/// Lifecycle state derived from the start/end timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unstarted,
    Active,
    Completed,
}

/// One conversation's messages, spans and timing
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    messages: Vec<Message>,
    spans: Vec<Span>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an empty, unstarted session
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            messages: Vec::new(),
            spans: Vec::new(),
            start_time: None,
            end_time: None,
        }
    }

    /// Build an unstarted session from imported wire messages.
    ///
    /// Fails fast on the first malformed entry.
    pub fn from_messages(messages: &[Value]) -> Result<Self, SessionError> {
        let mut session = Self::new();
        for message in messages {
            session.add_message(message)?;
        }
        tracing::debug!(
            session_id = %session.id,
            count = session.messages.len(),
            "Session rebuilt from message history"
        );
        Ok(session)
    }

    /// Validation predicate used by `add_message`
    pub fn validate_message_format(message: &Value) -> Result<Message, SessionError> {
        validate_message_format(message)
    }

    // ==================== Accessors ====================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Most recent span
    pub fn current_span(&self) -> Option<&Span> {
        self.spans.last()
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn state(&self) -> SessionState {
        match (self.start_time, self.end_time) {
            (_, Some(_)) => SessionState::Completed,
            (Some(_), None) => SessionState::Active,
            (None, None) => SessionState::Unstarted,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    pub fn is_completed(&self) -> bool {
        self.state() == SessionState::Completed
    }

    // ==================== Lifecycle ====================

    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.start_time.is_some() {
            return Err(SessionError::AlreadyStarted);
        }
        self.start_time = Some(Utc::now());
        tracing::info!(session_id = %self.id, "Session started");
        Ok(())
    }

    /// Mark the session finished and return the current span's output
    pub fn complete(&mut self) -> Result<Option<Value>, SessionError> {
        if !self.is_active() {
            return Err(SessionError::Inactive);
        }
        self.end_time = Some(Utc::now());
        tracing::info!(
            session_id = %self.id,
            messages = self.messages.len(),
            spans = self.spans.len(),
            "Session completed"
        );
        Ok(self.result())
    }

    /// Return to active. Sets the start time if the session never started.
    pub fn reactivate(&mut self) {
        self.end_time = None;
        if self.start_time.is_none() {
            self.start_time = Some(Utc::now());
        }
        tracing::info!(session_id = %self.id, messages = self.messages.len(), "Session reactivated");
    }

    // ==================== Spans ====================

    /// Append a span and run `body` over `arguments` through it
    pub fn exec<F>(&mut self, kind: SpanKind, arguments: Value, body: F) -> Result<Value, SessionError>
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        if !self.is_active() {
            return Err(SessionError::Inactive);
        }
        let mut span = Span::new(kind, arguments, Arc::new(body));
        let output = span.run();
        self.spans.push(span);
        tracing::debug!(session_id = %self.id, kind = ?kind, "Span executed");
        Ok(output)
    }

    /// Re-run every stored span in order, in place
    pub fn replay(&mut self) -> Option<Value> {
        for span in &mut self.spans {
            span.run();
        }
        self.result()
    }

    /// Output of the current span
    pub fn result(&self) -> Option<Value> {
        self.current_span().and_then(|span| span.output().cloned())
    }

    // ==================== Messages ====================

    /// Validate and append an imported wire message
    pub fn add_message(&mut self, message: &Value) -> Result<&Message, SessionError> {
        let message = validate_message_format(message)?;
        tracing::debug!(session_id = %self.id, role = %message.role(), "Message added");
        self.messages.push(message);
        Ok(&self.messages[self.messages.len() - 1])
    }

    pub fn add_user_message(&mut self, content: &str) -> Result<&Message, SessionError> {
        self.add_message(&json!({ "role": "user", "content": content }))
    }

    pub fn add_assistant_message(&mut self, content: &str) -> Result<&Message, SessionError> {
        self.add_message(&json!({ "role": "assistant", "content": content }))
    }

    /// Latest answer: the newest assistant message, else the newest ANSWER span output
    pub fn last_answer(&self) -> Option<String> {
        if let Some(message) = self
            .messages
            .iter()
            .rev()
            .find(|m| m.role() == Role::Assistant)
        {
            return Some(message.content().to_string());
        }

        self.spans
            .iter()
            .rev()
            .find(|s| s.kind() == SpanKind::Answer)
            .and_then(Span::output)
            .map(|output| match output {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
    }

    /// Timestamped records for caller-managed storage
    pub fn messages_for_export(&self) -> Vec<ExportedMessage> {
        export::export_messages(&self.messages, self.start_time, self.end_time, Utc::now())
    }
}
