//! Parley, a terminal tutor assistant.
//!
//! Wires a line-oriented chat loop to a hosted model reached through an
//! OpenAI-compatible chat-completions endpoint, with one tool (`get_weather`)
//! and an in-memory, append-only history per session.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use parley::prelude::*;
//!
//! # async fn example() -> parley::error::Result<()> {
//! let config = ParleyConfig::from_env()?;
//! let handler = TurnHandler::new(Arc::new(Agent::tutor(&config)))
//!     .with_turn_timeout(config.turn_timeout());
//! let surface = TerminalSurface::stdout();
//!
//! let session = handler.on_chat_start(&surface).await?;
//! let cancel = tokio_util::sync::CancellationToken::new();
//! let session = handler
//!     .on_message(&session, "What's the weather in Karachi?", &surface, &cancel)
//!     .await?;
//! assert_eq!(session.history().len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod chat;
pub mod config;
pub mod error;
pub mod generation;
pub mod prelude;
pub mod provider;
pub mod tools;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
