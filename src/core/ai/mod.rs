pub mod ai_service;
pub mod formatting;
pub mod models;

pub use ai_service::{AiProvider, AiService, AskError, DEFAULT_PERSONA_PROMPT};
pub use models::{AiConfig, AiMessage, AiProviderResponse, AskReply};
