// `/dev` - the developer's links as a row of buttons.
//
// Anyone in the channel may click, and each click gets its own ephemeral
// answer. The buttons stop listening after a minute and are then disabled.

use crate::core::collector::collect_within;
use crate::core::social::SocialLink;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::ops::ControlFlow;
use std::time::Duration;

/// How long the `/dev` buttons answer clicks.
pub const LINK_BUTTONS_WINDOW: Duration = Duration::from_secs(60);

pub const DEV_PROMPT: &str = "Conheça mais sobre mim! Escolha uma das opções abaixo:";

fn link_buttons(prefix: &str, disabled: bool) -> Vec<serenity::CreateActionRow> {
    let buttons = SocialLink::ALL
        .iter()
        .map(|link| {
            let style = if link.is_primary() {
                serenity::ButtonStyle::Primary
            } else {
                serenity::ButtonStyle::Secondary
            };
            serenity::CreateButton::new(link.custom_id(prefix))
                .label(link.label())
                .style(style)
                .disabled(disabled)
        })
        .collect();

    vec![serenity::CreateActionRow::Buttons(buttons)]
}

/// Links para as redes do desenvolvedor
#[poise::command(slash_command)]
pub async fn dev(ctx: Context<'_>) -> Result<(), Error> {
    let prefix = ctx.id().to_string();

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .content(DEV_PROMPT)
                .components(link_buttons(&prefix, false)),
        )
        .await?;
    let message_id = reply.message().await?.id;

    let clicks = serenity::ComponentInteractionCollector::new(ctx)
        .message_id(message_id)
        .timeout(LINK_BUTTONS_WINDOW)
        .stream();

    let prefix_ref = prefix.as_str();
    let end = collect_within(clicks, LINK_BUTTONS_WINDOW, |mci| async move {
        let Some(link) = SocialLink::from_custom_id(prefix_ref, &mci.data.custom_id) else {
            return ControlFlow::Continue(());
        };

        let response = serenity::CreateInteractionResponse::Message(
            serenity::CreateInteractionResponseMessage::new()
                .content(link.reply_message())
                .ephemeral(true),
        );

        if let Err(e) = mci.create_response(ctx.http(), response).await {
            tracing::warn!(user_id = mci.user.id.get(), "Failed to answer /dev click: {:?}", e);
        }

        ControlFlow::Continue(())
    })
    .await;

    tracing::debug!(?end, "/dev buttons closed");

    // The message may be gone by now.
    let _ = reply
        .edit(
            ctx,
            poise::CreateReply::default()
                .content(DEV_PROMPT)
                .components(link_buttons(&prefix, true)),
        )
        .await;

    Ok(())
}
