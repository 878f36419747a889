// `/ask` - one question to Bitinto-chan through the LLM.
//
// The cooldown is checked before anything else, and the interaction is
// deferred before the LLM call because Discord only waits three seconds
// for the first response.

use crate::core::ai::{AskError, AskReply};
use crate::discord::{Context, Error};
use std::time::Instant;

/// Sent when the model returns no text.
pub const EMPTY_ANSWER_MESSAGE: &str = "Não consegui gerar uma resposta. Tente novamente!";

/// Sent when the LLM request fails.
pub const UNAVAILABLE_MESSAGE: &str =
    "Estou passando um pouco mal no momento. Voltamos a falar mais tarde ok?";

pub fn cooldown_message(remaining_secs: u64) -> String {
    format!(
        "⏳ Aguarde {} segundo(s) antes de perguntar novamente!",
        remaining_secs
    )
}

/// Pergunte algo para a Bitinto-chan
#[poise::command(slash_command)]
pub async fn ask(
    ctx: Context<'_>,
    #[description = "Sua pergunta"] message: String,
) -> Result<(), Error> {
    let user_id = ctx.author().id.get();
    let data = ctx.data();

    let outcome = data
        .ai
        .ask_limited(
            &*data.ask_limiter,
            user_id,
            Instant::now(),
            &message,
            || async move { ctx.defer().await.map_err(Error::from) },
        )
        .await;

    let reply = match outcome {
        Ok(AskReply::Cooldown(secs)) => {
            tracing::debug!(user_id, "ask on cooldown");
            ctx.send(
                poise::CreateReply::default()
                    .content(cooldown_message(secs))
                    .ephemeral(true),
            )
            .await?;
            return Ok(());
        }
        Ok(AskReply::Answer(text)) => text,
        Ok(AskReply::Empty) => EMPTY_ANSWER_MESSAGE.to_string(),
        Err(AskError::Acknowledge(e)) => return Err(e),
        Err(AskError::Provider(e)) => {
            tracing::error!(user_id, model = data.ai.model(), "Groq API error: {}", e);
            UNAVAILABLE_MESSAGE.to_string()
        }
    };

    ctx.say(reply).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_message_shows_seconds() {
        assert_eq!(
            cooldown_message(4),
            "⏳ Aguarde 4 segundo(s) antes de perguntar novamente!"
        );
    }
}
