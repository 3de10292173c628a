//! Conversation messages and the wire-shape validator

use super::SessionError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            other => Err(SessionError::InvalidRole(other.to_string())),
        }
    }
}

/// A single validated conversation turn. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// Build a message, rejecting whitespace-only content
    pub fn new(role: Role, content: impl Into<String>) -> Result<Self, SessionError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(SessionError::EmptyContent);
        }
        Ok(Self { role, content })
    }

    pub fn user(content: impl Into<String>) -> Result<Self, SessionError> {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Result<Self, SessionError> {
        Self::new(Role::Assistant, content)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Wire form: `{"role": "...", "content": "..."}`
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "role": self.role.as_str(),
            "content": self.content,
        })
    }
}

/// Validate an imported message mapping.
///
/// Checks run in a fixed order so each failure names exactly one condition:
/// shape, role presence, content presence, role value, content emptiness.
/// Keys other than `role` and `content` are ignored.
pub fn validate_message_format(message: &Value) -> Result<Message, SessionError> {
    let Some(map) = message.as_object() else {
        return Err(SessionError::NotAMapping);
    };
    let role = map.get("role").ok_or(SessionError::MissingRole)?;
    let content = map.get("content").ok_or(SessionError::MissingContent)?;

    let role = match role {
        Value::String(s) => s.parse::<Role>()?,
        other => return Err(SessionError::InvalidRole(other.to_string())),
    };
    let content = match content {
        Value::String(s) => s.as_str(),
        Value::Null => return Err(SessionError::EmptyContent),
        _ => return Err(SessionError::MissingContent),
    };

    Message::new(role, content)
}
