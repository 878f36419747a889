// Bot presence shown in the member list.
//
// Only Discord SDK types here (Context, ActivityData, OnlineStatus).

use poise::serenity_prelude as serenity;

pub const DEFAULT_ACTIVITY: &str = "/ask com a Bitinto-chan";

/// Sets the default activity.
pub fn reset_status(ctx: &serenity::Context) {
    let activity = serenity::ActivityData::playing(DEFAULT_ACTIVITY);
    ctx.set_presence(Some(activity), serenity::OnlineStatus::Online);
}

/// Called once the gateway session is ready.
pub fn on_ready(ctx: &serenity::Context) {
    reset_status(ctx);
}
