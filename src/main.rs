// This is the entry point of the Bitinto-chan bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (databases, APIs)
// - `discord/` = Discord-specific adapters (commands, error hook, startup)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the Discord framework
// 4. Register commands once the session is ready

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

mod config;

use crate::config::{BotConfig, StoryBackend};
use crate::core::ai::{AiConfig, AiProvider, AiService, DEFAULT_PERSONA_PROMPT};
use crate::core::rate_limit::{InMemoryRateLimiter, ASK_COOLDOWN};
use crate::core::stories::{StoryService, StoryStore};
use crate::discord::registrar::{publish_commands, RegistrationScope};
use crate::discord::{commands, dispatcher, Data};
use crate::infra::ai::GroqClient;
use crate::infra::stories::{InMemoryStoryStore, SqliteStoryStore, SupabaseStoryStore};
use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;

/// How often stale cooldown entries are dropped.
const COOLDOWN_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 10);

async fn build_story_store(backend: &StoryBackend) -> anyhow::Result<Box<dyn StoryStore>> {
    let store: Box<dyn StoryStore> = match backend {
        StoryBackend::Supabase { url, api_key } => {
            tracing::info!(%url, "Stories stored in Supabase");
            Box::new(SupabaseStoryStore::new(url, api_key.clone()))
        }
        StoryBackend::Sqlite { path } => {
            // Keep runtime databases in a dedicated folder so the repo root stays tidy.
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
            let path = path.to_string_lossy();
            tracing::info!(%path, "Stories stored in SQLite");
            Box::new(SqliteStoryStore::new(&path).await?)
        }
        StoryBackend::Memory => {
            tracing::warn!("Stories kept in memory only; they are lost on restart");
            Box::new(InMemoryStoryStore::new())
        }
    };
    Ok(store)
}

fn load_system_prompt(config: &BotConfig) -> String {
    match &config.system_prompt_file {
        Some(path) => std::fs::read_to_string(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to read system prompt file at {}: {}", path.display(), e);
            DEFAULT_PERSONA_PROMPT.to_string()
        }),
        None => DEFAULT_PERSONA_PROMPT.to_string(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = BotConfig::from_env()?;

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================

    let story_store = build_story_store(&config.story_backend).await?;
    let story_service = Arc::new(StoryService::new(story_store));

    let groq_api_key = config.groq_api_key.clone().unwrap_or_else(|| {
        tracing::warn!("GROQ_API_KEY is not set; /ask will answer with its fallback message");
        String::new()
    });
    let ai_provider: Box<dyn AiProvider> = Box::new(GroqClient::new(groq_api_key));
    let ai_service = Arc::new(AiService::new(
        ai_provider,
        load_system_prompt(&config),
        AiConfig::ask(config.groq_model.clone()),
    ));

    let ask_limiter = Arc::new(InMemoryRateLimiter::new(ASK_COOLDOWN));

    let data = Data {
        ai: Arc::clone(&ai_service),
        stories: Arc::clone(&story_service),
        ask_limiter: Arc::clone(&ask_limiter),
    };

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    // Slash commands only; no message content needed.
    let intents = serenity::GatewayIntents::GUILDS;
    let scope = RegistrationScope::from_dev_guild(config.dev_guild_id);

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            on_error: |error| Box::pin(dispatcher::on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(dispatcher::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                tracing::info!("🤖 Bot is starting up...");

                publish_commands(ctx, &framework.options().commands, scope).await;

                // Background sweep of expired cooldown entries.
                let limiter = Arc::clone(&data.ask_limiter);
                tokio::spawn(async move {
                    let mut interval = tokio::time::interval(COOLDOWN_SWEEP_INTERVAL);
                    loop {
                        interval.tick().await;
                        let removed = limiter.purge_expired(std::time::Instant::now());
                        if removed > 0 {
                            tracing::debug!(
                                removed,
                                remaining = limiter.tracked_users(),
                                "Purged expired cooldowns"
                            );
                        }
                    }
                });

                tracing::info!("🚀 Bot is ready!");
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    client.start().await.context("Error running bot")?;

    Ok(())
}
