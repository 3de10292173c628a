//! Agent configuration

use std::str::FromStr;

/// Default bound on engine iterations per call
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

/// When the agent completes the session after a call returns
///
/// Revisions of this agent disagreed on whether a session rebuilt from
/// caller-supplied history is completed after each call. Both behaviors are
/// selectable; `OnlyWhenFresh` is the default pending product confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinalizePolicy {
    /// Complete every session after every call, continuing or not
    Always,
    /// Complete only sessions created by the fresh-start path
    #[default]
    OnlyWhenFresh,
}

impl FinalizePolicy {
    /// Whether a session entered through `fresh` (or not) is completed after the call
    pub fn should_finalize(self, fresh: bool) -> bool {
        match self {
            Self::Always => true,
            Self::OnlyWhenFresh => fresh,
        }
    }
}

impl FromStr for FinalizePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "always" => Ok(Self::Always),
            "only_when_fresh" => Ok(Self::OnlyWhenFresh),
            other => Err(format!("unknown finalize policy: {other}")),
        }
    }
}

/// Configuration for an [`Agent`](crate::Agent)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentConfig {
    pub max_iterations: u32,
    pub finalize_after_each_call: FinalizePolicy,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            finalize_after_each_call: FinalizePolicy::default(),
        }
    }
}

impl AgentConfig {
    /// Read `AGENT_MAX_ITERATIONS` and `AGENT_FINALIZE_AFTER_EACH_CALL`
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("AGENT_MAX_ITERATIONS").ok().as_deref(),
            std::env::var("AGENT_FINALIZE_AFTER_EACH_CALL").ok().as_deref(),
        )
    }

    fn from_vars(max_iterations: Option<&str>, finalize: Option<&str>) -> Self {
        let defaults = Self::default();

        let max_iterations = max_iterations.map_or(defaults.max_iterations, |raw| {
            raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid AGENT_MAX_ITERATIONS, using default");
                defaults.max_iterations
            })
        });

        let finalize_after_each_call = finalize.map_or(defaults.finalize_after_each_call, |raw| {
            raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!(error = %e, "Invalid AGENT_FINALIZE_AFTER_EACH_CALL, using default");
                defaults.finalize_after_each_call
            })
        });

        Self {
            max_iterations,
            finalize_after_each_call,
        }
    }
}
