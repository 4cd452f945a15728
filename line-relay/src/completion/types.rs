//! Completion endpoint request and response shapes.

use serde::{Deserialize, Serialize};

/// Body of the outbound completion request.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest<'a> {
    pub prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Completion response.
///
/// Upstreams disagree on where the text lives, so every known location is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Generated text, checking `choices[0].text`, then
    /// `choices[0].message.content`, then top-level `text`.
    pub fn into_text(self) -> Option<String> {
        let CompletionResponse { choices, text } = self;

        choices
            .into_iter()
            .next()
            .and_then(|c| c.text.or_else(|| c.message.and_then(|m| m.content)))
            .or(text)
    }
}
