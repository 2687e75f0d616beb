//! Chat Completions provider for any OpenAI-compatible endpoint.
//!
//! Used with Gemini's compatibility layer by default, but nothing here is
//! Gemini-specific.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ParleyError;
use crate::types::*;

use super::http::{bearer_headers, shared_client, status_to_error};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

pub struct OpenAiCompatibleProvider {
    model_id: String,
    api_key: String,
    base_url: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(model_id: String, api_key: String, base_url: String) -> Self {
        Self {
            model_id,
            api_key,
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub(crate) fn build_request_body(&self, request: &ProviderRequest) -> Value {
        let messages = request
            .messages
            .iter()
            .map(message_to_openai)
            .collect::<Vec<_>>();

        let mut body = serde_json::json!({
            "model": self.model_id,
            "messages": messages,
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            let settings = &request.settings;
            if let Some(max) = settings.max_tokens {
                obj.insert("max_tokens".into(), max.into());
            }
            if let Some(temp) = settings.temperature {
                obj.insert("temperature".into(), temp.into());
            }
            if let Some(top_p) = settings.top_p {
                obj.insert("top_p".into(), top_p.into());
            }
            if let Some(ref stops) = settings.stop_sequences {
                obj.insert("stop".into(), serde_json::json!(stops));
            }
            if let Some(seed) = settings.seed {
                obj.insert("seed".into(), seed.into());
            }

            if let Some(ref tools) = request.tools {
                if !tools.is_empty() {
                    let tool_defs: Vec<Value> = tools
                        .iter()
                        .map(|t| {
                            serde_json::json!({
                                "type": "function",
                                "function": {
                                    "name": t.name,
                                    "description": t.description,
                                    "parameters": t.parameters,
                                }
                            })
                        })
                        .collect();
                    obj.insert("tools".into(), tool_defs.into());
                }
            }
        }

        body
    }
}

#[async_trait]
impl ModelProvider for OpenAiCompatibleProvider {
    fn provider_name(&self) -> &str {
        "openai-compatible"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, ParleyError> {
        let body = self.build_request_body(request);

        debug!(
            model = %self.model_id,
            messages = request.messages.len(),
            "chat completions request"
        );

        let resp = shared_client()
            .post(self.endpoint())
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: ChatResponse = resp.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ParleyError::api(200, "No choices in chat completions response"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| AgentToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(Value::String(tc.function.arguments)),
            })
            .collect();

        Ok(ProviderResponse {
            text: choice.message.content.unwrap_or_default(),
            usage: data
                .usage
                .map(|u| Usage {
                    input_tokens: u.prompt_tokens,
                    output_tokens: u.completion_tokens,
                    total_tokens: u.total_tokens,
                })
                .unwrap_or_default(),
            tool_calls,
            finish_reason: choice
                .finish_reason
                .as_deref()
                .and_then(|s| s.parse().ok()),
        })
    }
}

fn message_to_openai(msg: &ModelMessage) -> Value {
    let role = msg.role.to_string();

    if let [ContentPart::ToolResult(tr)] = msg.content.as_slice() {
        return serde_json::json!({
            "role": "tool",
            "tool_call_id": tr.tool_call_id,
            "content": tr.content_text(),
        });
    }

    let tool_calls = msg.tool_calls();
    if !tool_calls.is_empty() {
        let tc_json: Vec<Value> = tool_calls
            .iter()
            .map(|tc| {
                serde_json::json!({
                    "id": tc.id,
                    "type": "function",
                    "function": {
                        "name": tc.name,
                        "arguments": tc.arguments.to_string(),
                    }
                })
            })
            .collect();
        let text = msg.text();
        return serde_json::json!({
            "role": role,
            "content": if text.is_empty() { Value::Null } else { Value::String(text) },
            "tool_calls": tc_json,
        });
    }

    serde_json::json!({ "role": role, "content": msg.text() })
}

// Chat Completions response types (internal)

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ChatToolCall>>,
}

#[derive(Deserialize)]
struct ChatToolCall {
    id: String,
    function: ChatFunction,
}

#[derive(Deserialize)]
struct ChatFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ToolDefinition;
    use pretty_assertions::assert_eq;

    fn provider() -> OpenAiCompatibleProvider {
        OpenAiCompatibleProvider::new(
            "gemini-2.0-flash".into(),
            "key".into(),
            "https://example.test/v1beta/openai/".into(),
        )
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        assert_eq!(
            provider().endpoint(),
            "https://example.test/v1beta/openai/chat/completions"
        );
    }

    #[test]
    fn body_carries_history_and_tools() {
        let call = AgentToolCall {
            id: "call_1".into(),
            name: "get_weather".into(),
            arguments: serde_json::json!({"location": "Paris"}),
        };
        let request = ProviderRequest {
            messages: vec![
                ModelMessage::system("be kind"),
                ModelMessage::user("weather in Paris?"),
                ModelMessage::assistant_tool_calls("", vec![call]),
                ModelMessage::tool_result("call_1", serde_json::json!("sunny"), false),
            ],
            settings: GenerationSettings::builder().temperature(0.5).build(),
            tools: Some(vec![ToolDefinition {
                name: "get_weather".into(),
                description: "weather".into(),
                parameters: serde_json::json!({"type": "object"}),
            }]),
        };

        let body = provider().build_request_body(&request);

        assert_eq!(body["model"], "gemini-2.0-flash");
        assert_eq!(body["temperature"], 0.5);
        assert_eq!(body["messages"][0], serde_json::json!({"role": "system", "content": "be kind"}));
        assert_eq!(body["messages"][2]["content"], Value::Null);
        assert_eq!(body["messages"][2]["tool_calls"][0]["function"]["name"], "get_weather");
        assert_eq!(
            body["messages"][3],
            serde_json::json!({"role": "tool", "tool_call_id": "call_1", "content": "sunny"})
        );
        assert_eq!(body["tools"][0]["type"], "function");
        assert!(body.get("max_tokens").is_none());
    }
}
