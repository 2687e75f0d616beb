//! Turn handling: one user message in, one assistant message out.
//!
//! Each turn runs the agent as a spawned task and waits on it alongside the
//! turn deadline and the caller's cancellation token. Whichever finishes
//! first decides the turn; a losing agent task is aborted, as is one whose
//! turn future is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, info};

use super::agent::Agent;
use super::session::Session;
use crate::chat::ChatSurface;
use crate::config::DEFAULT_TURN_TIMEOUT;
use crate::error::{ParleyError, Result};
use crate::types::{GenerateTextResult, ModelMessage};

pub const DEFAULT_GREETING: &str = "Hello! how can i help you today?";

/// Drives chat sessions against a shared agent.
#[derive(Debug, Clone)]
pub struct TurnHandler {
    agent: Arc<Agent>,
    turn_timeout: Option<Duration>,
    greeting: String,
}

impl TurnHandler {
    pub fn new(agent: Arc<Agent>) -> Self {
        Self {
            agent,
            turn_timeout: Some(DEFAULT_TURN_TIMEOUT),
            greeting: DEFAULT_GREETING.to_string(),
        }
    }

    /// Set the per-turn deadline; `None` waits for the agent indefinitely.
    pub fn with_turn_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.turn_timeout = timeout;
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Open a session with empty history and greet the user.
    pub async fn on_chat_start(&self, surface: &dyn ChatSurface) -> Result<Session> {
        let session = Session::new();
        info!(session = %session.id(), agent = %self.agent.name(), "session started");
        surface.send(&self.greeting).await?;
        Ok(session)
    }

    /// Process one user message and return the session with the turn appended.
    ///
    /// The full history, including the new message, is sent to the agent.
    /// On any error `session` is left as it was and nothing is sent.
    pub async fn on_message(
        &self,
        session: &Session,
        text: &str,
        surface: &dyn ChatSurface,
        cancel: &CancellationToken,
    ) -> Result<Session> {
        let mut next = session.clone();
        next.history_mut().add_user_message(text);

        let input = next.history().messages().to_vec();
        let result = self.run_agent(input, cancel).await?;

        surface.send(&result.text).await?;
        next.history_mut().add_assistant_message(result.text.clone());

        info!(
            session = %next.id(),
            turns = next.turns(),
            tool_calls = result.tool_call_count(),
            "turn completed"
        );
        Ok(next)
    }

    async fn run_agent(
        &self,
        input: Vec<ModelMessage>,
        cancel: &CancellationToken,
    ) -> Result<GenerateTextResult> {
        let agent = Arc::clone(&self.agent);
        // Dropping the handle aborts the run, so an abandoned turn stops too.
        let mut task = AbortOnDropHandle::new(tokio::spawn(async move { agent.run(&input).await }));

        let timeout = self.turn_timeout;
        let deadline = async move {
            match timeout {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            joined = &mut task => joined.map_err(|e| {
                ParleyError::InvalidState(format!("agent task failed: {e}"))
            })?,
            _ = cancel.cancelled() => {
                task.abort();
                debug!("turn cancelled");
                Err(ParleyError::Cancelled)
            }
            _ = deadline => {
                task.abort();
                let millis = timeout.map(|d| d.as_millis() as u64).unwrap_or_default();
                debug!(millis, "turn timed out");
                Err(ParleyError::Timeout(millis))
            }
        }
    }
}
