//! Tool system for function calling.

pub mod arguments;
pub mod tool;
pub mod types;
pub mod weather;

pub use arguments::ToolArguments;
pub use tool::{Tool, ToolExecutionContext};
pub use types::AgentToolParameters;
pub use weather::WeatherTool;
