// Discord layer - commands, error handling and startup hooks.

use crate::core::ai::{AiProvider, AiService};
use crate::core::rate_limit::InMemoryRateLimiter;
use crate::core::stories::{StoryService, StoryStore};
use std::sync::Arc;

#[path = "commands/command_catalog.rs"]
pub mod commands;

#[path = "dispatcher.rs"]
pub mod dispatcher;

#[path = "presence.rs"]
pub mod presence;

#[path = "registrar.rs"]
pub mod registrar;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Story service with whichever backend was configured at startup.
pub type Stories = StoryService<Box<dyn StoryStore>>;

/// AI service with whichever provider was configured at startup.
pub type Ai = AiService<Box<dyn AiProvider>>;

/// Shared state handed to every command.
pub struct Data {
    pub ai: Arc<Ai>,
    pub stories: Arc<Stories>,
    pub ask_limiter: Arc<InMemoryRateLimiter>,
}
