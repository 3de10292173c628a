//! Session error types

use thiserror::Error;

/// Errors raised by session lifecycle transitions and message validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `start()` called on a session that already has a start time
    #[error("Session has already been started")]
    AlreadyStarted,
    /// `exec()` or `complete()` called outside the active state
    #[error("Session is not active")]
    Inactive,

    // Message validation, one variant per violated condition
    #[error("Message must be a mapping with :role and :content keys")]
    NotAMapping,
    #[error("Message must have :role key")]
    MissingRole,
    #[error("Message must have :content key")]
    MissingContent,
    #[error("Message role must be :user, :assistant, or :system (got {0:?})")]
    InvalidRole(String),
    #[error("Message content must not be empty")]
    EmptyContent,
}

impl SessionError {
    /// True for errors produced by message validation rather than lifecycle misuse
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::AlreadyStarted | Self::Inactive)
    }
}
