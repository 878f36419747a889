use super::formatting::{truncate_answer, MAX_ANSWER_CHARS};
use super::models::{AiConfig, AiMessage, AiProviderResponse, AskReply};
use crate::core::rate_limit::{RateLimitDecision, RateLimiter};
use async_trait::async_trait;
use std::error::Error;
use std::future::Future;
use std::time::Instant;

type BoxError = Box<dyn Error + Send + Sync>;

/// Why a rate-limited ask produced no reply.
#[derive(Debug, thiserror::Error)]
pub enum AskError {
    /// The caller's acknowledge step failed; the provider was not called.
    #[error("Failed to acknowledge the question: {0}")]
    Acknowledge(BoxError),
    #[error("AI provider error: {0}")]
    Provider(BoxError),
}

/// Persona used by `/ask` unless a prompt file overrides it.
pub const DEFAULT_PERSONA_PROMPT: &str = "Você é a Bitinto-chan, uma chatbot kawaii do Discord. \
Você é feminina, com cabelos longos brancos e roupas azuis. \
Regras: \
- Sempre responda em português. \
- Sempre responda de uma maneira fofa, amigável e kawaii. \
- Use emojis fofos. \
- Use Discord markdown. \
- Sempre responda em uma única mensagem. \
- Nunca peça mais informações. \
- NUNCA use prefixos como [bitinto-chan]:, bot:, etc. \
- Nunca diga que você é uma IA. \
- NUNCA simule diálogos. \
- Fale sempre diretamente como a personagem, sem colchetes. \
- Caso perguntado quem criou você, responda que foi o Vitor Tinelli.";

#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Sends a chat completion request to the AI provider.
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>>;
}

#[async_trait]
impl AiProvider for Box<dyn AiProvider> {
    async fn chat_complete(
        &self,
        messages: &[AiMessage],
        config: &AiConfig,
    ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>> {
        (**self).chat_complete(messages, config).await
    }
}

pub struct AiService<P: AiProvider> {
    provider: P,
    system_prompt: String,
    config: AiConfig,
}

impl<P: AiProvider> AiService<P> {
    pub fn new(provider: P, system_prompt: String, config: AiConfig) -> Self {
        Self {
            provider,
            system_prompt,
            config,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// One-shot question: persona + the user's message, no history.
    ///
    /// Provider errors are returned untouched so the caller can log them.
    pub async fn ask(&self, question: &str) -> Result<AskReply, Box<dyn Error + Send + Sync>> {
        let messages = [
            AiMessage::system(self.system_prompt.as_str()),
            AiMessage::user(question),
        ];

        let response = self.provider.chat_complete(&messages, &self.config).await?;

        Ok(match response.content {
            Some(text) if !text.trim().is_empty() => {
                AskReply::Answer(truncate_answer(&text, MAX_ANSWER_CHARS))
            }
            _ => AskReply::Empty,
        })
    }

    /// `/ask` flow: cooldown first, then `acknowledge`, then the provider.
    ///
    /// A denied user gets `AskReply::Cooldown` and neither `acknowledge` nor
    /// the provider runs. Denials don't move the user's window.
    pub async fn ask_limited<L, F, Fut>(
        &self,
        limiter: &L,
        user_id: u64,
        now: Instant,
        question: &str,
        acknowledge: F,
    ) -> Result<AskReply, AskError>
    where
        L: RateLimiter + ?Sized,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), BoxError>>,
    {
        let decision = limiter.check_and_record(user_id, now);
        if let RateLimitDecision::Denied(_) = decision {
            return Ok(AskReply::Cooldown(decision.remaining_secs()));
        }

        acknowledge().await.map_err(AskError::Acknowledge)?;

        self.ask(question).await.map_err(AskError::Provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rate_limit::InMemoryRateLimiter;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Provider that replays a canned answer and remembers the request.
    struct ScriptedProvider {
        answer: Result<Option<String>, String>,
        seen: Mutex<Vec<(Vec<AiMessage>, Option<u32>, f32)>>,
    }

    impl ScriptedProvider {
        fn answering(answer: Option<&str>) -> Self {
            Self {
                answer: Ok(answer.map(str::to_string)),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                answer: Err(message.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AiProvider for ScriptedProvider {
        async fn chat_complete(
            &self,
            messages: &[AiMessage],
            config: &AiConfig,
        ) -> Result<AiProviderResponse, Box<dyn Error + Send + Sync>> {
            self.seen.lock().unwrap().push((
                messages.to_vec(),
                config.max_tokens,
                config.temperature,
            ));
            match &self.answer {
                Ok(content) => Ok(AiProviderResponse {
                    content: content.clone(),
                }),
                Err(message) => Err(message.clone().into()),
            }
        }
    }

    fn service(provider: ScriptedProvider) -> AiService<ScriptedProvider> {
        AiService::new(
            provider,
            "persona".to_string(),
            AiConfig::ask("llama-3.1-8b-instant"),
        )
    }

    #[tokio::test]
    async fn sends_persona_then_question_with_ask_settings() {
        let service = service(ScriptedProvider::answering(Some("oi!")));

        let reply = service.ask("tudo bem?").await.unwrap();

        assert_eq!(reply, AskReply::Answer("oi!".to_string()));
        let seen = service.provider.seen.lock().unwrap();
        let (messages, max_tokens, temperature) = &seen[0];
        assert_eq!(messages[0], AiMessage::system("persona"));
        assert_eq!(messages[1], AiMessage::user("tudo bem?"));
        assert_eq!(*max_tokens, Some(1024));
        assert!((*temperature - 0.7).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn long_answers_are_truncated() {
        let long = "x".repeat(2500);
        let service = service(ScriptedProvider::answering(Some(&long)));

        let reply = service.ask("conta uma história").await.unwrap();

        assert_eq!(reply, AskReply::Answer(format!("{}...", "x".repeat(1900))));
    }

    #[tokio::test]
    async fn missing_or_blank_content_is_empty() {
        let missing = service(ScriptedProvider::answering(None));
        let blank = service(ScriptedProvider::answering(Some("  \n")));

        assert_eq!(missing.ask("?").await.unwrap(), AskReply::Empty);
        assert_eq!(blank.ask("?").await.unwrap(), AskReply::Empty);
    }

    #[tokio::test]
    async fn boxed_providers_work_behind_the_service() {
        let provider: Box<dyn AiProvider> = Box::new(ScriptedProvider::answering(Some("olá")));
        let service = AiService::new(provider, "persona".to_string(), AiConfig::ask("m"));

        assert_eq!(
            service.ask("oi").await.unwrap(),
            AskReply::Answer("olá".to_string())
        );
    }

    #[tokio::test]
    async fn cooldown_is_checked_before_anything_else() {
        let service = service(ScriptedProvider::answering(Some("oi!")));
        let limiter = InMemoryRateLimiter::new(Duration::from_millis(5000));
        let start = Instant::now();
        limiter.check_and_record(7, start);

        let mut acknowledged = false;
        let reply = service
            .ask_limited(&limiter, 7, start + Duration::from_millis(1200), "?", || {
                acknowledged = true;
                async { Ok::<(), BoxError>(()) }
            })
            .await
            .unwrap();

        assert_eq!(reply, AskReply::Cooldown(4));
        assert!(!acknowledged);
        assert!(service.provider.seen.lock().unwrap().is_empty());

        // The denial did not restart the window: 5 s after the first call is free.
        let reply = service
            .ask_limited(&limiter, 7, start + Duration::from_millis(5000), "?", || async {
                Ok::<(), BoxError>(())
            })
            .await
            .unwrap();
        assert_eq!(reply, AskReply::Answer("oi!".to_string()));
    }

    #[tokio::test]
    async fn allowed_questions_are_acknowledged_before_the_provider_call() {
        let service = service(ScriptedProvider::answering(Some("oi!")));
        let limiter = InMemoryRateLimiter::new(Duration::from_millis(5000));

        let calls_at_ack = Mutex::new(None);
        let reply = service
            .ask_limited(&limiter, 7, Instant::now(), "tudo bem?", || {
                *calls_at_ack.lock().unwrap() = Some(service.provider.seen.lock().unwrap().len());
                async { Ok::<(), BoxError>(()) }
            })
            .await
            .unwrap();

        assert_eq!(reply, AskReply::Answer("oi!".to_string()));
        assert_eq!(*calls_at_ack.lock().unwrap(), Some(0));
        assert_eq!(service.provider.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_acknowledge_skips_the_provider() {
        let service = service(ScriptedProvider::answering(Some("oi!")));
        let limiter = InMemoryRateLimiter::new(Duration::from_millis(5000));

        let err = service
            .ask_limited(&limiter, 7, Instant::now(), "?", || async {
                Err::<(), BoxError>("interaction expired".into())
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AskError::Acknowledge(_)));
        assert!(service.provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn provider_failures_are_tagged() {
        let service = service(ScriptedProvider::failing("503 upstream"));
        let limiter = InMemoryRateLimiter::new(Duration::from_millis(5000));

        let err = service
            .ask_limited(&limiter, 7, Instant::now(), "?", || async { Ok::<(), BoxError>(()) })
            .await
            .unwrap_err();

        assert!(matches!(err, AskError::Provider(_)));
    }

    #[tokio::test]
    async fn provider_errors_are_propagated() {
        let service = service(ScriptedProvider::failing("503 upstream"));

        let err = service.ask("?").await.unwrap_err();

        assert!(err.to_string().contains("503"));
    }
}
