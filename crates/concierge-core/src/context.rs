use serde::{Deserialize, Serialize};
use std::fmt;

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in a sender's conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered conversation history, oldest first.
pub type History = Vec<Turn>;

/// Conversation context passed to a completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Instruction prompt, already rendered with live availability.
    pub system_prompt: String,
    /// Full history including the turn being answered (oldest first).
    pub history: History,
}

/// A structured message for API-based providers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// "user" or "assistant".
    pub role: String,
    /// The message content.
    pub content: String,
}

impl Context {
    /// Create a context with a system prompt and history.
    pub fn new(system_prompt: impl Into<String>, history: History) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            history,
        }
    }

    /// Convert context to structured API messages.
    ///
    /// Returns `(system_prompt, messages)` so providers that take the system
    /// prompt outside the messages array can do so.
    pub fn to_api_messages(&self) -> (String, Vec<ApiMessage>) {
        let messages = self
            .history
            .iter()
            .map(|turn| ApiMessage {
                role: turn.role.as_str().to_string(),
                content: turn.content.clone(),
            })
            .collect();

        (self.system_prompt.clone(), messages)
    }
}
