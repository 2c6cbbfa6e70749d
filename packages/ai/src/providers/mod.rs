//! LLM provider abstraction and implementations.
//!
//! Supports Anthropic and `OpenAI`-compatible chat APIs via a common trait.

pub mod anthropic;
pub mod openai;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::AiError;

/// Default Anthropic model.
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";

/// Default `OpenAI` model.
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Upper bound on generated tokens per request.
pub const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    /// The person (or tool results sent on their behalf).
    User,
    /// The model.
    Assistant,
}

/// A message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Sender.
    pub role: Role,
    /// Message content.
    pub content: MessageContent,
}

impl Message {
    /// A plain-text user message.
    #[must_use]
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }
}

/// Content of a message: either simple text or structured blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Simple text content.
    Text(String),
    /// Structured content blocks (for tool calls and results).
    Blocks(Vec<ContentBlock>),
}

/// A structured content block within a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
    /// A tool use request from the assistant.
    ToolUse {
        /// Unique ID for this tool use.
        id: String,
        /// Tool name.
        name: String,
        /// Tool input parameters.
        input: serde_json::Value,
    },
    /// A tool result being sent back.
    ToolResult {
        /// The `tool_use` ID this result corresponds to.
        tool_use_id: String,
        /// The result content.
        content: String,
    },
}

/// Response from the LLM provider.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Content blocks in the response.
    pub content: Vec<ContentBlock>,
    /// Why generation stopped.
    pub stop_reason: StopReason,
}

impl LlmResponse {
    /// Whether the response contains at least one tool call.
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        self.content
            .iter()
            .any(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Model finished its response naturally.
    EndTurn,
    /// Model wants to call one or more tools.
    ToolUse,
    /// Maximum tokens reached.
    MaxTokens,
}

/// Trait for LLM providers.
///
/// Tool definitions are passed in a neutral
/// `{ name, description, parameters }` shape; each provider converts them
/// to its own wire format.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request with tool definitions.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails.
    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[serde_json::Value],
    ) -> Result<LlmResponse, AiError>;
}

/// Supported provider backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum ProviderKind {
    /// Anthropic Messages API.
    #[strum(serialize = "anthropic", serialize = "claude")]
    Anthropic,
    /// `OpenAI` Chat Completions API, or a compatible server.
    #[strum(serialize = "openai", serialize = "gpt")]
    OpenAi,
}

/// Creates an LLM provider based on environment variables.
///
/// If `AI_PROVIDER` is explicitly set, uses that provider. Otherwise
/// auto-detects from available credentials:
///
/// 1. `ANTHROPIC_API_KEY` set -> Anthropic Claude
/// 2. `OPENAI_API_KEY` or `AI_BASE_URL` set -> `OpenAI`-compatible
///
/// `AI_MODEL` overrides the model for either provider. With `AI_BASE_URL`
/// the API key is optional, since most local servers don't check it.
///
/// # Errors
///
/// Returns [`AiError::Config`] if no provider can be configured.
pub fn create_provider_from_env() -> Result<Box<dyn LlmProvider>, AiError> {
    let kind = match std::env::var("AI_PROVIDER") {
        Ok(name) => name.parse::<ProviderKind>().map_err(|_| AiError::Config {
            message: format!("Unknown AI provider: {name}. Use 'anthropic' or 'openai'."),
        })?,
        Err(_) => detect_provider().ok_or_else(|| AiError::Config {
            message: "No AI credentials found. Set ANTHROPIC_API_KEY, OPENAI_API_KEY, \
                      or AI_BASE_URL (optionally with AI_PROVIDER)."
                .to_string(),
        })?,
    };
    let model = std::env::var("AI_MODEL").ok();

    match kind {
        ProviderKind::Anthropic => {
            let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| AiError::Config {
                message: "ANTHROPIC_API_KEY environment variable not set".to_string(),
            })?;
            let model = model.unwrap_or_else(|| DEFAULT_ANTHROPIC_MODEL.to_string());
            log::info!("AI provider: Anthropic ({model})");
            Ok(Box::new(anthropic::AnthropicProvider::new(api_key, model)))
        }
        ProviderKind::OpenAi => {
            let base_url = std::env::var("AI_BASE_URL").ok();
            let api_key = match (std::env::var("OPENAI_API_KEY"), &base_url) {
                (Ok(key), _) => key,
                (Err(_), Some(_)) => String::new(),
                (Err(_), None) => {
                    return Err(AiError::Config {
                        message: "OPENAI_API_KEY environment variable not set".to_string(),
                    });
                }
            };
            let model = model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
            let mut provider = openai::OpenAiProvider::new(api_key, model.clone());
            if let Some(url) = base_url {
                log::info!("AI provider: OpenAI-compatible at {url} ({model})");
                provider = provider.with_base_url(url);
            } else {
                log::info!("AI provider: OpenAI ({model})");
            }
            Ok(Box::new(provider))
        }
    }
}

/// Picks a provider from the credentials present in the environment.
fn detect_provider() -> Option<ProviderKind> {
    if std::env::var("ANTHROPIC_API_KEY").is_ok() {
        log::info!("Auto-detected AI provider: Anthropic (ANTHROPIC_API_KEY found)");
        return Some(ProviderKind::Anthropic);
    }

    if std::env::var("OPENAI_API_KEY").is_ok() || std::env::var("AI_BASE_URL").is_ok() {
        log::info!("Auto-detected AI provider: OpenAI-compatible");
        return Some(ProviderKind::OpenAi);
    }

    log::warn!("No AI credentials detected; the ask endpoint will answer with a fallback");
    None
}
