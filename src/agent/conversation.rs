//! Append-only conversation history.

use crate::types::{ModelMessage, Role};

/// Ordered user/assistant history of one session.
///
/// Messages are only ever appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<ModelMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user message.
    pub fn add_user_message(&mut self, text: impl Into<String>) {
        self.messages.push(ModelMessage::user(text));
    }

    /// Add an assistant message.
    pub fn add_assistant_message(&mut self, text: impl Into<String>) {
        self.messages.push(ModelMessage::assistant(text));
    }

    /// Get all messages, oldest first.
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    /// Roles in chronological order.
    pub fn roles(&self) -> Vec<Role> {
        self.messages.iter().map(|m| m.role).collect()
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
