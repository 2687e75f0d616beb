//! Agent definition: instructions, model and tool set bundled together.

use std::sync::Arc;

use tracing::debug;

use crate::config::ParleyConfig;
use crate::error::ParleyError;
use crate::generation::{generate_text, DEFAULT_MAX_TURNS};
use crate::provider::{self, ModelProvider};
use crate::tools::tool::Tool;
use crate::tools::WeatherTool;
use crate::types::*;

pub const TUTOR_NAME: &str = "teacher/tutor assistant";

pub const TUTOR_INSTRUCTIONS: &str = "you explain concepts about AI Agent in a simple and easy to \
understand way, you are a teacher/tutor assistant about AI Agent. You are very patient and helpful. \
You always answer the question asked by the user, and if you don't know the answer, you say that \
you don't know the answer. if someone asks about weather then use the get_weather tool to get the \
weather You never say that you are an AI model or an agent, you always act like a human being.";

/// An immutable agent definition, shared by every session.
pub struct Agent {
    name: String,
    instructions: Option<String>,
    provider: Arc<dyn ModelProvider>,
    tools: Vec<Box<dyn Tool>>,
    settings: GenerationSettings,
    max_turns: usize,
}

impl Agent {
    /// Create an agent with no instructions and no tools.
    pub fn new(name: impl Into<String>, provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            name: name.into(),
            instructions: None,
            provider,
            tools: Vec::new(),
            settings: GenerationSettings::default(),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    /// The tutor assistant: persona instructions plus the weather tool.
    pub fn tutor(config: &ParleyConfig) -> Self {
        Self::new(TUTOR_NAME, provider::create_provider(config))
            .with_instructions(TUTOR_INSTRUCTIONS)
            .with_tool(Box::new(WeatherTool::from_config(config)))
    }

    /// Set the system instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Add a tool.
    pub fn with_tool(mut self, tool: Box<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Set generation settings.
    pub fn with_settings(mut self, settings: GenerationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Cap the number of model calls per run.
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn model_id(&self) -> &str {
        self.provider.model_id()
    }

    /// Run the agent over a conversation and return the full run result.
    ///
    /// The instructions are prepended as a system message; `input` is sent
    /// as-is, so callers pass the whole history every time.
    pub async fn run(&self, input: &[ModelMessage]) -> Result<GenerateTextResult, ParleyError> {
        let mut messages = Vec::with_capacity(input.len() + 1);
        if let Some(ref instructions) = self.instructions {
            messages.push(ModelMessage::system(instructions.clone()));
        }
        messages.extend(input.iter().cloned());

        debug!(
            agent = %self.name,
            provider = self.provider.provider_name(),
            model = self.provider.model_id(),
            history = input.len(),
            "running agent"
        );
        generate_text(
            self.provider.as_ref(),
            messages,
            self.settings.clone(),
            &self.tools,
            self.max_turns,
        )
        .await
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("provider", &self.provider.provider_name())
            .field("model", &self.provider.model_id())
            .field("tools", &self.tool_names())
            .field("max_turns", &self.max_turns)
            .finish()
    }
}
