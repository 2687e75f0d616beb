//! Chat sessions.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::conversation::Conversation;

/// One chat connection and its history.
///
/// A session is a plain value: the turn handler takes it by reference and
/// hands back the successor, so no turn ever sees a half-updated history.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    started_at: DateTime<Utc>,
    history: Conversation,
}

impl Session {
    /// Start a session with empty history.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            history: Conversation::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn history(&self) -> &Conversation {
        &self.history
    }

    /// Number of completed turns.
    pub fn turns(&self) -> usize {
        self.history.len() / 2
    }

    pub(crate) fn history_mut(&mut self) -> &mut Conversation {
        &mut self.history
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sessions_are_empty_and_distinct() {
        let a = Session::new();
        let b = Session::new();
        assert!(a.history().is_empty());
        assert_eq!(a.turns(), 0);
        assert_ne!(a.id(), b.id());
    }
}
