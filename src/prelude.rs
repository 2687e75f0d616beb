//! Convenience re-exports for common use.

pub use crate::agent::{Agent, Conversation, Session, TurnHandler};
pub use crate::chat::{detached_reader, run_chat, ChatSurface, TerminalSurface};
pub use crate::config::ParleyConfig;
pub use crate::error::{ParleyError, Result};
pub use crate::provider::{ModelProvider, OpenAiCompatibleProvider};
pub use crate::tools::{AgentToolParameters, Tool, ToolArguments, WeatherTool};
pub use crate::types::{GenerateTextResult, GenerationSettings, ModelMessage, Role};
