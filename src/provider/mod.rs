//! Model provider trait and the OpenAI-compatible implementation.

pub mod http;
pub mod openai_compatible;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ParleyConfig;
use crate::error::ParleyError;
use crate::types::{AgentToolCall, FinishReason, GenerationSettings, ModelMessage, Usage};

pub use openai_compatible::OpenAiCompatibleProvider;

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider: either tool calls to run or final text.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub tool_calls: Vec<AgentToolCall>,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by model backends.
///
/// Whether to call a tool is decided remotely; a provider only reports the
/// calls it was handed back.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai-compatible").
    fn provider_name(&self) -> &str;

    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate a response (non-streaming).
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, ParleyError>;
}

/// Create the configured model provider.
pub fn create_provider(config: &ParleyConfig) -> Arc<dyn ModelProvider> {
    Arc::new(OpenAiCompatibleProvider::new(
        config.model_id().to_string(),
        config.model_api_key().to_string(),
        config.model_base_url().to_string(),
    ))
}
