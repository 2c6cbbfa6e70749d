//! Agent loop orchestration.
//!
//! Implements the agentic tool-use loop: user question -> LLM decides
//! tools -> execute tools -> feed results back -> repeat until final answer.

use astralens_features::FeatureCatalog;
use astralens_geometry::CoordinateTransform;
use astralens_geometry::overlay::RiskZoneIndex;

use crate::AiError;
use crate::providers::{ContentBlock, LlmProvider, Message, MessageContent, Role, StopReason};
use crate::tools::{ToolContext, execute_tool, summarize_tool_result, tool_definitions};

/// Maximum number of agent loop iterations to prevent infinite loops.
const MAX_ITERATIONS: u32 = 10;

/// Maximum size of a tool result JSON string before truncation.
const MAX_TOOL_RESULT_BYTES: usize = 8000;

/// Data the agent can consult, used for the tools and the system prompt.
pub struct AgentContext<'a> {
    /// Name of the map being viewed.
    pub map_name: &'a str,
    /// Feature database.
    pub catalog: &'a FeatureCatalog,
    /// Transform for the current map.
    pub transform: &'a CoordinateTransform,
    /// Risk zones.
    pub zones: &'a RiskZoneIndex,
}

impl AgentContext<'_> {
    const fn tools(&self) -> ToolContext<'_> {
        ToolContext {
            catalog: self.catalog,
            transform: self.transform,
            zones: self.zones,
        }
    }
}

fn build_system_prompt(context: &AgentContext<'_>) -> String {
    let zones = context
        .zones
        .zones()
        .iter()
        .map(|z| match &z.level {
            Some(level) => format!("{} ({level})", z.name),
            None => z.name.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ");

    format!(
        r"You are a lunar exploration assistant inside AstraLens, an interactive map of {map}. You help users understand surface features, plan landing sites and measure distances.

## Available Data
- Named surface features: {features} (craters, maria, mountains and more)
- Known hazard zones: {zones}
- Area analysis grades landing suitability from A+ (flat, mostly safe) to D (steep); a cell is safe when its slope is under 8 degrees.

## Instructions
1. Use the tools to look things up. Do NOT invent coordinates or statistics.
2. When the user names a feature, call search_features first to find its ID and coordinates.
3. For distances between features, look both up and call measure_distance with their coordinates.
4. For landing questions, call analyze_area on a box of a few degrees around the site and mention any hazard zones the site lies in.
5. Latitudes run from -90 (south) to 90 (north); longitudes from -180 to 180 (east positive).
6. Slope values are synthetic placeholders; say so when quoting analysis results.

Be concise. Answer in plain text suitable for a small chat panel.",
        map = context.map_name,
        features = context.catalog.len(),
        zones = if zones.is_empty() { "none" } else { zones.as_str() },
    )
}

/// Runs the AI agent loop for a user question and returns the final answer.
///
/// # Errors
///
/// Returns [`AiError`] if the provider fails or the loop exceeds its
/// iteration limit. Tool failures are reported back to the model instead.
pub async fn run_agent(
    provider: &dyn LlmProvider,
    context: &AgentContext<'_>,
    question: &str,
) -> Result<String, AiError> {
    let system_prompt = build_system_prompt(context);
    let tools = tool_definitions();

    let mut messages = vec![Message::user_text(question)];

    for iteration in 0..MAX_ITERATIONS {
        log::debug!("Agent iteration {iteration}");

        let response = provider.chat(&system_prompt, &messages, &tools).await?;

        if response.stop_reason != StopReason::ToolUse || !response.has_tool_calls() {
            return Ok(extract_text(&response.content));
        }

        let mut tool_results = Vec::new();

        for block in &response.content {
            if let ContentBlock::ToolUse { id, name, input } = block {
                log::info!("Tool call: {name} {input}");

                let content = match execute_tool(context.tools(), name, input) {
                    Ok(json) => {
                        log::info!("Tool result: {}", summarize_tool_result(name, &json));
                        truncate(json.to_string())
                    }
                    Err(e) => {
                        log::warn!("Tool {name} failed: {e}");
                        format!("Tool error: {e}")
                    }
                };

                tool_results.push(ContentBlock::ToolResult {
                    tool_use_id: id.clone(),
                    content,
                });
            }
        }

        messages.push(Message {
            role: Role::Assistant,
            content: MessageContent::Blocks(response.content),
        });
        messages.push(Message {
            role: Role::User,
            content: MessageContent::Blocks(tool_results),
        });
    }

    Err(AiError::MaxIterations {
        max_iterations: MAX_ITERATIONS,
    })
}

fn truncate(raw: String) -> String {
    if raw.len() <= MAX_TOOL_RESULT_BYTES {
        return raw;
    }
    let mut cut = MAX_TOOL_RESULT_BYTES;
    while !raw.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}... (truncated)", &raw[..cut])
}

/// Extracts text content from content blocks.
fn extract_text(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(|b| match b {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::providers::LlmResponse;
    use serde_json::json;

    /// Replays canned responses and records the messages it was sent.
    struct Scripted {
        responses: Mutex<Vec<LlmResponse>>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl Scripted {
        fn new(mut responses: Vec<LlmResponse>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for Scripted {
        async fn chat(
            &self,
            _system_prompt: &str,
            messages: &[Message],
            _tools: &[serde_json::Value],
        ) -> Result<LlmResponse, AiError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| AiError::Provider {
                    message: "script exhausted".to_string(),
                })
        }
    }

    fn text(s: &str) -> LlmResponse {
        LlmResponse {
            content: vec![ContentBlock::Text {
                text: s.to_string(),
            }],
            stop_reason: StopReason::EndTurn,
        }
    }

    fn tool_call(name: &str, input: serde_json::Value) -> LlmResponse {
        LlmResponse {
            content: vec![ContentBlock::ToolUse {
                id: "call_1".to_string(),
                name: name.to_string(),
                input,
            }],
            stop_reason: StopReason::ToolUse,
        }
    }

    fn fixtures() -> (FeatureCatalog, RiskZoneIndex) {
        (
            FeatureCatalog::from_json_str(
                r#"[{"id":"TYC-1","name":"Tycho","coordinates":[-43.31,-11.36]}]"#,
            )
            .unwrap(),
            RiskZoneIndex::bundled().unwrap(),
        )
    }

    #[tokio::test]
    async fn direct_answer_needs_no_tools() {
        let (catalog, zones) = fixtures();
        let ctx = AgentContext {
            map_name: "the Moon",
            catalog: &catalog,
            transform: &CoordinateTransform::MOON,
            zones: &zones,
        };
        let provider = Scripted::new(vec![text("Hello from orbit.")]);
        let answer = run_agent(&provider, &ctx, "hi").await.unwrap();
        assert_eq!(answer, "Hello from orbit.");
    }

    #[tokio::test]
    async fn tool_results_are_fed_back() {
        let (catalog, zones) = fixtures();
        let ctx = AgentContext {
            map_name: "the Moon",
            catalog: &catalog,
            transform: &CoordinateTransform::MOON,
            zones: &zones,
        };
        let provider = Scripted::new(vec![
            tool_call("search_features", json!({ "query": "tycho" })),
            text("Tycho is at 43.31 S, 11.36 W."),
        ]);

        let answer = run_agent(&provider, &ctx, "Where is Tycho?").await.unwrap();
        assert_eq!(answer, "Tycho is at 43.31 S, 11.36 W.");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        let second = &seen[1];
        assert_eq!(second.len(), 3);
        match &second[2].content {
            MessageContent::Blocks(blocks) => match &blocks[0] {
                ContentBlock::ToolResult { content, .. } => assert!(content.contains("TYC-1")),
                other => panic!("expected tool result, got {other:?}"),
            },
            MessageContent::Text(_) => panic!("expected blocks"),
        }
    }

    #[tokio::test]
    async fn tool_errors_are_reported_to_the_model() {
        let (catalog, zones) = fixtures();
        let ctx = AgentContext {
            map_name: "the Moon",
            catalog: &catalog,
            transform: &CoordinateTransform::MOON,
            zones: &zones,
        };
        let provider = Scripted::new(vec![
            tool_call("lookup_feature", json!({ "id": "ZZZ-9" })),
            text("I couldn't find that feature."),
        ]);
        run_agent(&provider, &ctx, "Tell me about ZZZ-9").await.unwrap();

        let seen = provider.seen.lock().unwrap();
        let MessageContent::Blocks(blocks) = &seen[1][2].content else {
            panic!("expected blocks");
        };
        let ContentBlock::ToolResult { content, .. } = &blocks[0] else {
            panic!("expected tool result");
        };
        assert!(content.starts_with("Tool error:"));
    }

    #[tokio::test]
    async fn loop_is_bounded() {
        let (catalog, zones) = fixtures();
        let ctx = AgentContext {
            map_name: "the Moon",
            catalog: &catalog,
            transform: &CoordinateTransform::MOON,
            zones: &zones,
        };
        let responses = (0..MAX_ITERATIONS)
            .map(|_| tool_call("search_features", json!({ "query": "tycho" })))
            .collect();
        let provider = Scripted::new(responses);
        let err = run_agent(&provider, &ctx, "loop forever").await.unwrap_err();
        assert!(matches!(err, AiError::MaxIterations { max_iterations: 10 }));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let raw = "é".repeat(MAX_TOOL_RESULT_BYTES);
        let cut = truncate(raw);
        assert!(cut.ends_with("... (truncated)"));
        assert!(cut.len() <= MAX_TOOL_RESULT_BYTES + "... (truncated)".len());
    }

    #[test]
    fn system_prompt_lists_zones() {
        let (catalog, zones) = fixtures();
        let ctx = AgentContext {
            map_name: "the Moon",
            catalog: &catalog,
            transform: &CoordinateTransform::MOON,
            zones: &zones,
        };
        let prompt = build_system_prompt(&ctx);
        assert!(prompt.contains("Tycho Ejecta Blanket (high)"));
        assert!(prompt.contains("Named surface features: 1"));
    }
}
