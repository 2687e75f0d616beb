//! Text generation with tool loop.

use tracing::{debug, warn};

use crate::error::ParleyError;
use crate::provider::{ModelProvider, ProviderRequest, ToolDefinition};
use crate::tools::arguments::ToolArguments;
use crate::tools::tool::{Tool, ToolExecutionContext};
use crate::types::*;

/// Default cap on model calls per run.
pub const DEFAULT_MAX_TURNS: usize = 10;

/// Generate text with a tool loop.
///
/// If the model returns tool calls, they are executed in order and fed back
/// until the model produces a final text response. Running out of
/// `max_turns` model calls is an error.
pub async fn generate_text(
    provider: &dyn ModelProvider,
    mut messages: Vec<ModelMessage>,
    settings: GenerationSettings,
    tools: &[Box<dyn Tool>],
    max_turns: usize,
) -> Result<GenerateTextResult, ParleyError> {
    let tool_defs: Option<Vec<ToolDefinition>> = if tools.is_empty() {
        None
    } else {
        Some(tools.iter().map(|t| t.definition()).collect())
    };

    let mut steps = Vec::new();
    let mut total_usage = Usage::default();

    for turn in 0..max_turns {
        let request = ProviderRequest {
            messages: messages.clone(),
            settings: settings.clone(),
            tools: tool_defs.clone(),
        };

        debug!(turn, messages = messages.len(), "generate_text: calling provider");
        let response = provider.generate_text(&request).await?;
        total_usage.merge(&response.usage);

        let mut step = GenerationStep {
            text: response.text.clone(),
            tool_calls: response.tool_calls.clone(),
            tool_results: Vec::new(),
            usage: response.usage,
            finish_reason: response.finish_reason,
        };

        if response.tool_calls.is_empty() {
            steps.push(step);
            return Ok(GenerateTextResult {
                text: response.text,
                steps,
                messages,
                usage: total_usage,
                finish_reason: response.finish_reason,
            });
        }

        messages.push(ModelMessage::assistant_tool_calls(
            response.text.clone(),
            response.tool_calls.clone(),
        ));

        for tc in &response.tool_calls {
            let result = execute_tool_call(tools, tc).await;
            step.tool_results.push(result.clone());
            messages.push(ModelMessage::tool_result(
                result.tool_call_id,
                result.result,
                result.is_error,
            ));
        }

        steps.push(step);
    }

    Err(ParleyError::MaxTurnsExceeded(max_turns))
}

async fn execute_tool_call(tools: &[Box<dyn Tool>], tc: &AgentToolCall) -> AgentToolResult {
    let Some(tool) = tools.iter().find(|t| t.name() == tc.name) else {
        warn!(tool = %tc.name, "Tool not found");
        return AgentToolResult {
            tool_call_id: tc.id.clone(),
            result: serde_json::json!({"error": format!("Tool '{}' not found", tc.name)}),
            is_error: true,
        };
    };

    let ctx = ToolExecutionContext {
        tool_call_id: Some(tc.id.clone()),
    };
    let args = ToolArguments::new(tc.arguments.clone());
    match tool.execute(&args, &ctx).await {
        Ok(result) => AgentToolResult {
            tool_call_id: tc.id.clone(),
            result,
            is_error: false,
        },
        Err(e) => {
            warn!(tool = %tc.name, error = %e, "Tool execution failed");
            AgentToolResult {
                tool_call_id: tc.id.clone(),
                result: serde_json::json!({"error": e.to_string()}),
                is_error: true,
            }
        }
    }
}
