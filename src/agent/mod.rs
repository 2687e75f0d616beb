//! Agent system: definition, sessions and turn handling.

pub mod agent;
pub mod conversation;
pub mod handler;
pub mod session;

pub use agent::Agent;
pub use conversation::Conversation;
pub use handler::TurnHandler;
pub use session::Session;
