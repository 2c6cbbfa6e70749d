//! Anthropic Messages API provider.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{
    ContentBlock, LlmProvider, LlmResponse, MAX_OUTPUT_TOKENS, Message, MessageContent,
    StopReason,
};
use crate::AiError;

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Anthropic Claude API provider.
pub struct AnthropicProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Converts a message to the Messages API shape. The neutral
/// [`ContentBlock`] serialization already matches Anthropic's block tags.
fn to_wire_message(message: &Message) -> Result<Value, AiError> {
    let content = match &message.content {
        MessageContent::Text(text) => json!(text),
        MessageContent::Blocks(blocks) => serde_json::to_value(blocks)?,
    };
    Ok(json!({ "role": message.role.as_ref(), "content": content }))
}

fn to_wire_tool(tool: &Value) -> Value {
    json!({
        "name": tool["name"],
        "description": tool["description"],
        "input_schema": tool["parameters"],
    })
}

fn parse_stop_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("tool_use") => StopReason::ToolUse,
        Some("max_tokens") => StopReason::MaxTokens,
        _ => StopReason::EndTurn,
    }
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[Value],
    ) -> Result<LlmResponse, AiError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_OUTPUT_TOKENS,
            system: system_prompt,
            messages: messages
                .iter()
                .map(to_wire_message)
                .collect::<Result<_, _>>()?,
            tools: tools.iter().map(to_wire_tool).collect(),
        };

        let resp = self
            .client
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map_or_else(|_| format!("HTTP {status}: {body}"), |e| e.error.message);
            return Err(AiError::Provider { message });
        }

        let response: MessagesResponse = serde_json::from_str(&body)?;

        let content = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(ContentBlock::Text { text }),
                ResponseBlock::ToolUse { id, name, input } => {
                    Some(ContentBlock::ToolUse { id, name, input })
                }
                ResponseBlock::Other => None,
            })
            .collect();

        Ok(LlmResponse {
            content,
            stop_reason: parse_stop_reason(response.stop_reason.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Role;

    #[test]
    fn tool_results_keep_their_block_tags() {
        let message = Message {
            role: Role::User,
            content: MessageContent::Blocks(vec![ContentBlock::ToolResult {
                tool_use_id: "toolu_1".to_string(),
                content: "ok".to_string(),
            }]),
        };
        let wire = to_wire_message(&message).unwrap();
        assert_eq!(wire["role"], "user");
        assert_eq!(wire["content"][0]["type"], "tool_result");
        assert_eq!(wire["content"][0]["tool_use_id"], "toolu_1");
    }

    #[test]
    fn tools_use_input_schema() {
        let tool = json!({ "name": "t", "description": "d", "parameters": { "type": "object" } });
        let wire = to_wire_tool(&tool);
        assert_eq!(wire["input_schema"]["type"], "object");
        assert!(wire.get("parameters").is_none());
    }

    #[test]
    fn unknown_blocks_are_ignored() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"thinking","thinking":"..."},{"type":"text","text":"hi"}],"stop_reason":"end_turn"}"#,
        )
        .unwrap();
        assert_eq!(response.content.len(), 2);
        assert!(matches!(response.content[0], ResponseBlock::Other));
        assert_eq!(
            parse_stop_reason(response.stop_reason.as_deref()),
            StopReason::EndTurn
        );
    }
}
