// Top-level interaction handling.
//
// poise routes slash commands to their handler by name. What is left here is
// everything around that: interactions naming no known command, errors that
// escape a handler, and the gateway events the bot cares about.

use crate::discord::{presence, Data, Error};
use poise::serenity_prelude as serenity;
use std::sync::atomic::Ordering;

pub const UNKNOWN_COMMAND_MESSAGE: &str = "Comando não reconhecido.";

pub const COMMAND_FAILED_MESSAGE: &str = "❌ Ocorreu um erro ao executar o comando.";

/// How an error message reaches the user. Discord accepts a single initial
/// response per interaction; everything after it must be a follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseRoute {
    InitialReply,
    FollowUp,
}

impl ResponseRoute {
    pub fn for_state(initial_response_sent: bool) -> Self {
        if initial_response_sent {
            ResponseRoute::FollowUp
        } else {
            ResponseRoute::InitialReply
        }
    }
}

/// Fixed text the error hooks send back to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub content: &'static str,
    pub ephemeral: bool,
}

impl Notice {
    fn message(&self) -> serenity::CreateInteractionResponseMessage {
        serenity::CreateInteractionResponseMessage::new()
            .content(self.content)
            .ephemeral(self.ephemeral)
    }

    /// As the interaction's initial response.
    pub fn as_response(&self) -> serenity::CreateInteractionResponse {
        serenity::CreateInteractionResponse::Message(self.message())
    }

    /// As a follow-up, once the initial response is used up.
    pub fn as_followup(&self) -> serenity::CreateInteractionResponseFollowup {
        serenity::CreateInteractionResponseFollowup::new()
            .content(self.content)
            .ephemeral(self.ephemeral)
    }
}

pub fn unknown_command_notice() -> Notice {
    Notice {
        content: UNKNOWN_COMMAND_MESSAGE,
        ephemeral: true,
    }
}

pub fn command_failed_notice() -> Notice {
    Notice {
        content: COMMAND_FAILED_MESSAGE,
        ephemeral: true,
    }
}

/// Framework error hook.
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::UnknownInteraction {
            ctx, interaction, ..
        } => {
            tracing::warn!(command = %interaction.data.name, "Unknown command interaction");

            let response = unknown_command_notice().as_response();
            if let Err(e) = interaction.create_response(ctx, response).await {
                tracing::error!("Failed to answer unknown command: {}", e);
            }
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            let command = ctx.command().qualified_name.clone();
            tracing::error!(%command, user_id = ctx.author().id.get(), "Command error: {}", error);
            report_failure(ctx).await;
        }
        poise::FrameworkError::CommandPanic { payload, ctx, .. } => {
            let command = ctx.command().qualified_name.clone();
            tracing::error!(%command, ?payload, "Command panicked");
            report_failure(ctx).await;
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling framework error: {}", e);
            }
        }
    }
}

/// Send the generic failure message through whichever channel is still open.
async fn report_failure(ctx: poise::Context<'_, Data, Error>) {
    let notice = command_failed_notice();
    let result = match ctx {
        poise::Context::Application(app) => {
            let sent = app.has_sent_initial_response.load(Ordering::SeqCst);
            match ResponseRoute::for_state(sent) {
                ResponseRoute::InitialReply => {
                    app.interaction
                        .create_response(ctx.serenity_context(), notice.as_response())
                        .await
                }
                ResponseRoute::FollowUp => app
                    .interaction
                    .create_followup(ctx.serenity_context(), notice.as_followup())
                    .await
                    .map(|_| ()),
            }
        }
        poise::Context::Prefix(_) => ctx.say(notice.content).await.map(|_| ()),
    };

    if let Err(e) = result {
        tracing::error!("Failed to report command failure: {}", e);
    }
}

/// Event handler for non-command Discord events.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    _data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Ready { data_about_bot } = event {
        tracing::info!("✅ Bot logado como {}", data_about_bot.user.tag());
        presence::on_ready(ctx);
    }

    Ok(())
}
