//! Gemini API types for requests and responses

use crate::message::{Message, MessageRole};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GeminiContent {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![GeminiPart {
                text: Some(text.to_string()),
            }],
        }
    }
}

/// Split messages into a system instruction and `user`/`model` turns
pub(crate) fn convert_messages(
    messages: &[Message],
) -> (Option<GeminiContent>, Vec<GeminiContent>) {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == MessageRole::System && !m.content.is_empty())
        .map(|m| m.content.as_str())
        .collect();

    let contents = messages
        .iter()
        .filter_map(|m| match m.role {
            MessageRole::System => None,
            MessageRole::User => Some(GeminiContent::text(Some("user"), &m.content)),
            MessageRole::Assistant => Some(GeminiContent::text(Some("model"), &m.content)),
        })
        .collect();

    let system = (!system.is_empty()).then(|| GeminiContent::text(None, &system.join("\n\n")));
    (system, contents)
}

// ============================================================================
// Response Types
// ============================================================================

/// Full response, also the shape of every streamed chunk
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    pub content: Option<GeminiContent>,
}

impl GeminiResponse {
    /// Text of the first candidate's parts
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiErrorDetail {
    pub code: Option<u16>,
    #[serde(default)]
    pub message: String,
}
