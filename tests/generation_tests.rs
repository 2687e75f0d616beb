//! Tests for the tool-calling loop using a scripted provider.

mod common;

use async_trait::async_trait;
use common::MockProvider;
use parley::error::ParleyError;
use parley::generation::generate_text;
use parley::tools::{AgentToolParameters, Tool, ToolArguments, ToolExecutionContext};
use parley::types::*;
use pretty_assertions::assert_eq;
use serde_json::json;

/// Returns the `city` argument upper-cased.
struct ShoutTool {
    parameters: AgentToolParameters,
}

impl ShoutTool {
    fn boxed() -> Box<dyn Tool> {
        Box::new(Self {
            parameters: AgentToolParameters::from_schema(json!({
                "type": "object",
                "properties": {"city": {"type": "string"}},
                "required": ["city"],
            })),
        })
    }
}

#[async_trait]
impl Tool for ShoutTool {
    fn name(&self) -> &str {
        "shout"
    }

    fn description(&self) -> &str {
        "Upper-case a city name"
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        _ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, ParleyError> {
        Ok(json!(args.get_str("city")?.to_uppercase()))
    }
}

#[tokio::test]
async fn plain_answer_takes_one_step() {
    let provider = MockProvider::new("test-model");
    provider.queue_response("Agents perceive, decide and act.");

    let result = generate_text(
        &provider,
        vec![ModelMessage::user("What is an agent?")],
        GenerationSettings::default(),
        &[],
        10,
    )
    .await
    .unwrap();

    assert_eq!(result.text, "Agents perceive, decide and act.");
    assert_eq!(result.steps.len(), 1);
    assert_eq!(result.finish_reason, Some(FinishReason::Stop));
    assert!(provider.requests()[0].tools.is_none());
}

#[tokio::test]
async fn tool_results_are_fed_back_to_the_model() {
    let provider = MockProvider::new("test-model");
    provider.queue_tool_call("call_1", "shout", json!({"city": "oslo"}));
    provider.queue_response("It says OSLO.");

    let tools = vec![ShoutTool::boxed()];
    let result = generate_text(
        &provider,
        vec![ModelMessage::user("shout oslo")],
        GenerationSettings::default(),
        &tools,
        10,
    )
    .await
    .unwrap();

    assert_eq!(result.text, "It says OSLO.");
    assert_eq!(result.steps.len(), 2);
    assert_eq!(result.tool_call_count(), 1);
    assert_eq!(result.usage.total_tokens, 45);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    let tool_defs = requests[0].tools.as_ref().expect("tools advertised");
    assert_eq!(tool_defs[0].name, "shout");

    let second = &requests[1].messages;
    assert_eq!(
        second.iter().map(|m| m.role).collect::<Vec<_>>(),
        vec![Role::User, Role::Assistant, Role::Tool]
    );
    assert_eq!(second[1].tool_calls()[0].id, "call_1");
    match &second[2].content[0] {
        ContentPart::ToolResult(tr) => {
            assert_eq!(tr.tool_call_id, "call_1");
            assert_eq!(tr.result, json!("OSLO"));
            assert!(!tr.is_error);
        }
        other => panic!("expected tool result, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_tool_is_reported_to_the_model() {
    let provider = MockProvider::new("test-model");
    provider.queue_tool_call("call_9", "teleport", json!({}));
    provider.queue_response("I can't do that.");

    let tools = vec![ShoutTool::boxed()];
    let result = generate_text(
        &provider,
        vec![ModelMessage::user("teleport me")],
        GenerationSettings::default(),
        &tools,
        10,
    )
    .await
    .unwrap();

    assert_eq!(result.text, "I can't do that.");
    let tool_result = &result.steps[0].tool_results[0];
    assert!(tool_result.is_error);
    assert_eq!(tool_result.result["error"], "Tool 'teleport' not found");
}

#[tokio::test]
async fn tool_errors_do_not_abort_the_run() {
    let provider = MockProvider::new("test-model");
    provider.queue_tool_call("call_1", "shout", json!({"town": "oslo"}));
    provider.queue_response("Sorry, that failed.");

    let tools = vec![ShoutTool::boxed()];
    let result = generate_text(
        &provider,
        vec![ModelMessage::user("shout")],
        GenerationSettings::default(),
        &tools,
        10,
    )
    .await
    .unwrap();

    let tool_result = &result.steps[0].tool_results[0];
    assert!(tool_result.is_error);
    assert!(tool_result.result["error"]
        .as_str()
        .unwrap_or_default()
        .contains("city"));
    assert_eq!(result.text, "Sorry, that failed.");
}

#[tokio::test]
async fn endless_tool_calls_hit_the_turn_cap() {
    let provider = MockProvider::new("test-model");
    for i in 0..3 {
        provider.queue_tool_call(&format!("call_{i}"), "shout", json!({"city": "x"}));
    }

    let tools = vec![ShoutTool::boxed()];
    let err = generate_text(
        &provider,
        vec![ModelMessage::user("loop")],
        GenerationSettings::default(),
        &tools,
        3,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ParleyError::MaxTurnsExceeded(3)));
    assert_eq!(provider.request_count(), 3);
}

#[tokio::test]
async fn provider_errors_propagate() {
    let provider = MockProvider::new("test-model");
    provider.queue_error(ParleyError::api(503, "overloaded"));

    let err = generate_text(
        &provider,
        vec![ModelMessage::user("hi")],
        GenerationSettings::default(),
        &[],
        10,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ParleyError::Api { status: 503, .. }));
}
