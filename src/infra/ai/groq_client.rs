// Groq chat-completions client.
//
// Groq speaks the OpenAI wire format: a bearer token, `messages[]` with
// role/content pairs, and the answer at `choices[0].message.content`.

use crate::core::ai::{
    models::{AiConfig, AiMessage, AiProviderResponse},
    AiProvider,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::error::Error;

const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [AiMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
    }
}

pub struct GroqClient {
    client: Client,
    api_key: String,
    url: String,
}

impl GroqClient {
    pub fn new(api_key: String) -> Self {
        Self::with_url(api_key, GROQ_CHAT_URL)
    }

    /// Point the client at another OpenAI-compatible endpoint.
    pub fn with_url(api_key: String, url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            url: url.into(),
        }
    }
}

#[async_trait]
impl AiProvider for GroqClient {
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>> {
        if self.api_key.is_empty() {
            return Err("Groq API key is not configured".into());
        }

        let payload = ChatRequest {
            model: &config.model,
            messages,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await?;
            return Err(format!("Groq API error: {} - {}", status, text).into());
        }

        let body: ChatResponse = response.json().await?;

        Ok(AiProviderResponse {
            content: body.into_content(),
        })
    }
}
