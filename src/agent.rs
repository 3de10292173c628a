//! Agent: decides which session a call runs in and delegates to the engine
//!
//! Every call resolves exactly one [`Continuation`] up front:
//!
//! - caller supplied a non-empty history -> `ReplayHistory`
//! - agent is already continuing          -> `ResumeCurrent`
//! - otherwise                            -> `FreshStart`
//!
//! Fresh sessions are completed when the call exits on any path. Continuing
//! sessions stay active so the caller can keep extending them, unless
//! [`FinalizePolicy::Always`] is configured.

mod config;
mod error;

pub use config::{AgentConfig, FinalizePolicy, DEFAULT_MAX_ITERATIONS};
pub use error::AgentError;

use crate::engine::{EngineConfig, EngineFactory, NoTools, Toolchain};
use crate::llm::{LlmClient, MeteredClient, Usage};
use crate::session::Session;
use serde_json::Value;
use std::sync::Arc;

/// Input to the legacy dual-mode [`Agent::continue_with`]
#[derive(Debug, Clone, Copy)]
pub enum ContinueWith<'a> {
    /// Next task for the conversation that is already continuing
    Task(&'a str),
    /// Full message history to rebuild a conversation from
    History(&'a [Value]),
}

/// How a call obtains its session
#[derive(Debug)]
enum Continuation {
    FreshStart,
    ResumeCurrent,
    ReplayHistory(Session),
}

impl Continuation {
    fn name(&self) -> &'static str {
        match self {
            Continuation::FreshStart => "fresh_start",
            Continuation::ResumeCurrent => "resume_current",
            Continuation::ReplayHistory(_) => "replay_history",
        }
    }
}

/// Orchestrates sessions over its lifetime
pub struct Agent {
    context: String,
    model: Arc<MeteredClient>,
    tools: Arc<dyn Toolchain>,
    engines: Arc<dyn EngineFactory>,
    config: AgentConfig,
    /// Sessions replaced by a newer one, oldest first
    retired: Vec<Session>,
    /// Session the next continuing call operates on
    current: Option<Session>,
    /// Current session came from caller-supplied history
    continuing: bool,
}

impl Agent {
    pub fn new(
        context: impl Into<String>,
        model: Arc<dyn LlmClient>,
        engines: Arc<dyn EngineFactory>,
    ) -> Self {
        Self {
            context: context.into(),
            model: Arc::new(MeteredClient::new(model)),
            tools: Arc::new(NoTools),
            engines,
            config: AgentConfig::default(),
            retired: Vec::new(),
            current: None,
            continuing: false,
        }
    }

    #[must_use]
    pub fn with_tools(mut self, tools: Arc<dyn Toolchain>) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    /// Tokens spent by every model call this agent's engines made
    pub fn usage(&self) -> Usage {
        self.model.usage()
    }

    // ==================== Queries ====================

    /// Most recently created session
    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Every session this agent created, oldest first
    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.retired.iter().chain(self.current.as_ref())
    }

    pub fn is_running(&self) -> bool {
        self.current.as_ref().is_some_and(Session::is_active)
    }

    pub fn is_continuing(&self) -> bool {
        self.continuing
    }

    // ==================== Entry points ====================

    pub async fn run(&mut self, task: &str) -> Result<String, AgentError> {
        self.execute(task, None).await
    }

    /// Run and hand back the session the call used
    pub async fn run_returning_session(
        &mut self,
        task: &str,
    ) -> Result<(String, &Session), AgentError> {
        let answer = self.execute(task, None).await?;
        let session = self
            .current
            .as_ref()
            .ok_or(AgentError::NoActiveConversation)?;
        Ok((answer, session))
    }

    /// Run against caller-supplied history. An empty history is treated as
    /// no history at all.
    pub async fn run_with_history(
        &mut self,
        task: &str,
        messages: &[Value],
    ) -> Result<String, AgentError> {
        self.execute(task, Some(messages)).await
    }

    /// [`run_with_history`](Self::run_with_history), handing back the session
    pub async fn run_with_history_returning_session(
        &mut self,
        task: &str,
        messages: &[Value],
    ) -> Result<(String, &Session), AgentError> {
        let answer = self.execute(task, Some(messages)).await?;
        let session = self
            .current
            .as_ref()
            .ok_or(AgentError::NoActiveConversation)?;
        Ok((answer, session))
    }

    /// Legacy dual-mode continuation.
    ///
    /// `Task` continues the conversation that is already continuing.
    /// `History` rebuilds a conversation and requires `new_task`.
    pub async fn continue_with(
        &mut self,
        input: ContinueWith<'_>,
        new_task: Option<&str>,
    ) -> Result<String, AgentError> {
        match input {
            ContinueWith::Task(task) => {
                if task.trim().is_empty() {
                    return Err(AgentError::EmptyTask);
                }
                if !self.continuing || self.current.is_none() {
                    return Err(AgentError::NoActiveConversation);
                }
                self.execute(task, None).await
            }
            ContinueWith::History(messages) => {
                if messages.is_empty() {
                    return Err(AgentError::EmptyHistory);
                }
                let task = new_task.ok_or(AgentError::MissingTask)?;
                self.execute(task, Some(messages)).await
            }
        }
    }

    // ==================== Internals ====================

    async fn execute(&mut self, task: &str, history: Option<&[Value]>) -> Result<String, AgentError> {
        if task.trim().is_empty() {
            return Err(AgentError::EmptyTask);
        }

        let mode = self.resolve(history)?;
        let fresh = matches!(mode, Continuation::FreshStart);
        tracing::info!(mode = mode.name(), "Resolved continuation mode");
        self.enter(mode)?;

        let finalize = self.config.finalize_after_each_call.should_finalize(fresh);
        let session = self
            .current
            .as_mut()
            .ok_or(AgentError::NoActiveConversation)?;
        let mut engine = self.engines.create(EngineConfig {
            context: self.context.clone(),
            model: Arc::clone(&self.model) as Arc<dyn LlmClient>,
            tools: Arc::clone(&self.tools),
            session_id: session.id().to_string(),
            max_iterations: self.config.max_iterations,
        });

        let guard = FinalizeOnExit {
            session,
            armed: finalize,
        };
        let result = engine.reason(&mut *guard.session, task).await;
        drop(guard);

        match &result {
            Ok(_) => tracing::info!(fresh, finalized = finalize, "Agent call finished"),
            Err(e) => tracing::warn!(error = %e, fresh, finalized = finalize, "Agent call failed"),
        }
        result.map_err(AgentError::from)
    }

    fn resolve(&self, history: Option<&[Value]>) -> Result<Continuation, AgentError> {
        if let Some(messages) = history.filter(|m| !m.is_empty()) {
            return Ok(Continuation::ReplayHistory(Session::from_messages(messages)?));
        }
        if self.continuing {
            return match self.current {
                Some(_) => Ok(Continuation::ResumeCurrent),
                None => Err(AgentError::NoActiveConversation),
            };
        }
        Ok(Continuation::FreshStart)
    }

    /// Install the session for `mode` as current and make it active
    fn enter(&mut self, mode: Continuation) -> Result<(), AgentError> {
        match mode {
            Continuation::FreshStart => {
                self.retire_current();
                let mut session = Session::new();
                session.start()?;
                self.current = Some(session);
                self.continuing = false;
            }
            Continuation::ResumeCurrent => {
                let session = self
                    .current
                    .as_mut()
                    .ok_or(AgentError::NoActiveConversation)?;
                if !session.is_active() {
                    session.reactivate();
                }
            }
            Continuation::ReplayHistory(mut session) => {
                self.retire_current();
                session.reactivate();
                self.current = Some(session);
                self.continuing = true;
            }
        }
        Ok(())
    }

    fn retire_current(&mut self) {
        if let Some(mut previous) = self.current.take() {
            complete_session(&mut previous);
            self.retired.push(previous);
        }
    }
}

/// Complete `session` if it is still active
fn complete_session(session: &mut Session) {
    if session.is_active() {
        if let Err(error) = session.complete() {
            tracing::warn!(session_id = %session.id(), %error, "Failed to complete session");
        }
    }
}

/// Completes the session on drop when armed: success, error, panic or a
/// dropped future all leave no active fresh session behind.
struct FinalizeOnExit<'a> {
    session: &'a mut Session,
    armed: bool,
}

impl Drop for FinalizeOnExit<'_> {
    fn drop(&mut self) {
        if self.armed {
            complete_session(self.session);
        }
    }
}
