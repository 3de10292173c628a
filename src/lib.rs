//! Agent Session - conversation lifecycle for LLM-backed agents
//!
//! A [`Session`] is an append-only log of messages and execution spans with
//! a start/end lifecycle. An [`Agent`] decides, per call, whether to start a
//! fresh session, resume the current one, or rebuild one from caller-supplied
//! history, then hands the session to a reasoning [`Engine`].

pub mod agent;
pub mod engine;
pub mod llm;
pub mod session;

#[cfg(test)]
mod testing;

pub use agent::{Agent, AgentConfig, AgentError, ContinueWith, FinalizePolicy};
pub use engine::{
    AnswerEngine, AnswerEngineFactory, Engine, EngineConfig, EngineError, EngineFactory, NoTools,
    Toolchain,
};
pub use llm::{LlmClient, LlmError, LlmRequest, LlmResponse, MeteredClient, Usage};
pub use session::{
    ExportedMessage, Message, Role, Session, SessionError, SessionState, Span, SpanKind,
};
