//! `OpenAI` Chat Completions provider.
//!
//! Also works against any server exposing the same API (Ollama, vLLM,
//! llama.cpp, LM Studio) through [`OpenAiProvider::with_base_url`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    ContentBlock, LlmProvider, LlmResponse, MAX_OUTPUT_TOKENS, Message, MessageContent, Role,
    StopReason,
};
use crate::AiError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// `OpenAI` API provider.
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    /// Creates a new `OpenAI` provider.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Points the provider at a compatible server, e.g.
    /// `http://localhost:11434/v1`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl WireMessage {
    const fn text(role: &'static str, content: String) -> Self {
        Self {
            role,
            content: Some(content),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: WireFunction,
}

fn function_type() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

#[derive(Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: Value,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Flattens the conversation into Chat Completions messages.
///
/// Assistant block messages become one message with `tool_calls`; user
/// block messages become one `tool` message per result.
fn to_wire_messages(system_prompt: &str, messages: &[Message]) -> Result<Vec<WireMessage>, AiError> {
    let mut wire = vec![WireMessage::text("system", system_prompt.to_string())];

    for msg in messages {
        match (&msg.content, msg.role) {
            (MessageContent::Text(text), Role::User) => {
                wire.push(WireMessage::text("user", text.clone()));
            }
            (MessageContent::Text(text), Role::Assistant) => {
                wire.push(WireMessage::text("assistant", text.clone()));
            }
            (MessageContent::Blocks(blocks), Role::Assistant) => {
                let mut text = Vec::new();
                let mut tool_calls = Vec::new();
                for block in blocks {
                    match block {
                        ContentBlock::Text { text: t } => text.push(t.as_str()),
                        ContentBlock::ToolUse { id, name, input } => {
                            tool_calls.push(WireToolCall {
                                id: id.clone(),
                                call_type: function_type(),
                                function: WireFunction {
                                    name: name.clone(),
                                    arguments: serde_json::to_string(input)?,
                                },
                            });
                        }
                        ContentBlock::ToolResult { .. } => {}
                    }
                }
                let text = text.join("\n");
                wire.push(WireMessage {
                    role: "assistant",
                    content: (!text.is_empty()).then_some(text),
                    tool_calls,
                    tool_call_id: None,
                });
            }
            (MessageContent::Blocks(blocks), Role::User) => {
                for block in blocks {
                    if let ContentBlock::ToolResult {
                        tool_use_id,
                        content,
                    } = block
                    {
                        wire.push(WireMessage {
                            role: "tool",
                            content: Some(content.clone()),
                            tool_calls: Vec::new(),
                            tool_call_id: Some(tool_use_id.clone()),
                        });
                    }
                }
            }
        }
    }

    Ok(wire)
}

fn from_wire_choice(choice: Choice) -> LlmResponse {
    let mut content = Vec::new();

    if let Some(text) = choice.message.content
        && !text.is_empty()
    {
        content.push(ContentBlock::Text { text });
    }

    for call in choice.message.tool_calls {
        let input = serde_json::from_str(&call.function.arguments).unwrap_or_else(|e| {
            log::warn!(
                "Unparseable arguments for tool {}: {e}",
                call.function.name
            );
            Value::Object(serde_json::Map::new())
        });
        content.push(ContentBlock::ToolUse {
            id: call.id,
            name: call.function.name,
            input,
        });
    }

    let stop_reason = match choice.finish_reason.as_deref() {
        Some("tool_calls") => StopReason::ToolUse,
        Some("length") => StopReason::MaxTokens,
        // Some compatible servers report "stop" even when calling tools.
        _ if content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. })) =>
        {
            StopReason::ToolUse
        }
        _ => StopReason::EndTurn,
    };

    LlmResponse {
        content,
        stop_reason,
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[Value],
    ) -> Result<LlmResponse, AiError> {
        let request = CompletionRequest {
            model: &self.model,
            messages: to_wire_messages(system_prompt, messages)?,
            tools: tools
                .iter()
                .map(|t| WireTool {
                    tool_type: "function",
                    function: t.clone(),
                })
                .collect(),
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        let mut req = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json");
        if !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }
        let resp = req.json(&request).send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map_or_else(|_| format!("HTTP {status}: {body}"), |e| e.error.message);
            return Err(AiError::Provider { message });
        }

        let response: CompletionResponse = serde_json::from_str(&body)?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AiError::Provider {
                message: "No choices in completion response".to_string(),
            })?;

        Ok(from_wire_choice(choice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn base_url_is_normalized() {
        let provider = OpenAiProvider::new(String::new(), "llama3".to_string())
            .with_base_url("http://localhost:11434/v1/");
        assert_eq!(
            provider.completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn tool_round_trip_is_flattened() {
        let messages = vec![
            Message::user_text("How far is Tycho from Copernicus?"),
            Message {
                role: Role::Assistant,
                content: MessageContent::Blocks(vec![ContentBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: "measure_distance".to_string(),
                    input: json!({ "lat1": 0.0 }),
                }]),
            },
            Message {
                role: Role::User,
                content: MessageContent::Blocks(vec![ContentBlock::ToolResult {
                    tool_use_id: "call_1".to_string(),
                    content: "{}".to_string(),
                }]),
            },
        ];

        let wire = to_wire_messages("sys", &messages).unwrap();
        assert_eq!(wire.len(), 4);
        assert_eq!(wire[0].role, "system");
        assert_eq!(wire[2].role, "assistant");
        assert!(wire[2].content.is_none());
        assert_eq!(wire[2].tool_calls[0].function.name, "measure_distance");
        assert_eq!(wire[3].role, "tool");
        assert_eq!(wire[3].tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn tool_calls_without_finish_reason_still_count() {
        let choice: Choice = serde_json::from_value(json!({
            "message": {
                "content": null,
                "tool_calls": [{
                    "id": "c1",
                    "function": { "name": "search_features", "arguments": "{\"query\":\"tycho\"}" }
                }]
            },
            "finish_reason": "stop"
        }))
        .unwrap();

        let response = from_wire_choice(choice);
        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(
            response.content[0],
            ContentBlock::ToolUse {
                id: "c1".to_string(),
                name: "search_features".to_string(),
                input: json!({ "query": "tycho" }),
            }
        );
    }
}
