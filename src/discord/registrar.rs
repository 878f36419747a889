// Publishes the slash command schema to Discord.
//
// Runs once after the gateway session is ready. A failed publish is logged
// and the bot stays connected; the commands from the previous deploy keep
// working in that case.

use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

/// Where the schema goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationScope {
    /// The bot's whole application. Can take a while to propagate.
    Global,
    /// A single guild, updated instantly. Used during development.
    Guild(u64),
}

impl RegistrationScope {
    pub fn from_dev_guild(dev_guild_id: Option<u64>) -> Self {
        match dev_guild_id {
            Some(id) => RegistrationScope::Guild(id),
            None => RegistrationScope::Global,
        }
    }
}

/// Publish `commands`. Failures are logged, never returned: the bot keeps
/// serving whatever schema Discord already has.
pub async fn publish_commands(
    ctx: &serenity::Context,
    commands: &[poise::Command<Data, Error>],
    scope: RegistrationScope,
) {
    tracing::info!(count = commands.len(), ?scope, "🔄 Registrando comandos slash...");

    let result = match scope {
        RegistrationScope::Global => poise::builtins::register_globally(ctx, commands).await,
        RegistrationScope::Guild(id) => {
            poise::builtins::register_in_guild(ctx, commands, serenity::GuildId::new(id)).await
        }
    };

    match result {
        Ok(()) => tracing::info!("✅ Comandos registrados com sucesso!"),
        Err(e) => tracing::error!(?scope, "❌ Erro ao registrar comandos: {}", e),
    }
}
