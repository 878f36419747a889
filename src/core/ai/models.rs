use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiMessage {
    pub role: String,
    pub content: String,
}

impl AiMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AiConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl AiConfig {
    /// Settings used by `/ask`.
    pub fn ask(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.7,
            max_tokens: Some(1024),
        }
    }
}

/// Raw answer from an AI provider.
///
/// `content` is `None` when the completion came back without any text
/// (no choices, or a null message).
#[derive(Debug, Clone, Default)]
pub struct AiProviderResponse {
    pub content: Option<String>,
}

/// What `/ask` should show, after post-processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskReply {
    /// Ready to send; already cut to the Discord-safe length.
    Answer(String),
    /// The model answered with nothing usable.
    Empty,
    /// Refused by the rate limiter; seconds until the user may ask again.
    Cooldown(u64),
}
