//! Execution-trace spans
//!
//! A span records one unit of work run inside an active session. The work is
//! a pure function of the span's captured arguments, so it can be re-run
//! later by `Session::replay` without retained lexical state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Tag describing what a span did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpanKind {
    /// Produced the final answer for a task
    Answer,
    /// Intermediate reasoning step
    Reason,
}

/// Unit of work executed through a span
pub type SpanBody = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// One recorded unit of work with its output slot
#[derive(Clone)]
pub struct Span {
    kind: SpanKind,
    arguments: Value,
    output: Option<Value>,
    body: SpanBody,
}

impl Span {
    pub(crate) fn new(kind: SpanKind, arguments: Value, body: SpanBody) -> Self {
        Self {
            kind,
            arguments,
            output: None,
            body,
        }
    }

    /// Run the body over the captured arguments and store its output
    pub(crate) fn run(&mut self) -> Value {
        let output = (self.body)(&self.arguments);
        self.output = Some(output.clone());
        output
    }

    pub fn kind(&self) -> SpanKind {
        self.kind
    }

    pub fn arguments(&self) -> &Value {
        &self.arguments
    }

    /// Output of the last run, `None` if the span never ran
    pub fn output(&self) -> Option<&Value> {
        self.output.as_ref()
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Span")
            .field("kind", &self.kind)
            .field("arguments", &self.arguments)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}
