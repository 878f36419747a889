// Discord commands module.
// Each feature gets its own command file.

use crate::discord::{Data, Error};

pub mod ask;

pub mod social;

pub mod stories;

/// Every slash command the bot serves, in registration order.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        ask::ask(),
        social::dev(),
        stories::create_story(),
        stories::read_story(),
        stories::edit_story(),
        stories::delete_story(),
    ]
}
