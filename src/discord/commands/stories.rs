// Discord commands for the RPG story feature.
//
// **Pattern:**
// 1. Validate the raw options (cheap, no I/O) and answer right away on error
// 2. Defer, then call the story service
// 3. Render the outcome as an embed
//
// Every reply is ephemeral, the story embed included.

use crate::core::collector::first_within;
use crate::core::stories::{
    DeleteChoice, DeletionOutcome, NewStory, Story, StoryEdit, StoryError, StoryField,
};
use crate::discord::{Context, Error, Stories};
use chrono::{DateTime, Utc};
use chrono_tz::America::Sao_Paulo;
use poise::serenity_prelude as serenity;
use std::time::Duration;

/// How long the delete prompt waits for the author's answer.
pub const DELETE_CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

const COLOR_ERROR: u32 = 0xED4245;
const COLOR_SUCCESS: u32 = 0x57F287;
const COLOR_WARNING: u32 = 0xE67E22;
const COLOR_STORY: u32 = 0x3498DB;
const COLOR_NEUTRAL: u32 = 0x95A5A6;

// ============================================================================
// RENDERING HELPERS
// ============================================================================

/// Story dates as shown to Brazilian users: `dd/mm/yyyy` in São Paulo time.
pub fn format_story_date(timestamp: Option<DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => ts.with_timezone(&Sao_Paulo).format("%d/%m/%Y").to_string(),
        None => "N/A".to_string(),
    }
}

/// User-facing text for errors caught by validation.
pub fn validation_message(err: &StoryError) -> Option<&'static str> {
    match err {
        StoryError::TitleTooLong(_) => Some("O título deve ter no máximo 100 caracteres!"),
        StoryError::ContentTooLong(_) => Some("O conteúdo deve ter no máximo 4000 caracteres!"),
        StoryError::NothingToEdit => {
            Some("Você precisa fornecer pelo menos um novo título ou novo conteúdo!")
        }
        _ => None,
    }
}

/// One line per changed field, for the edit confirmation.
pub fn describe_changes(changed: &[StoryField]) -> String {
    changed
        .iter()
        .map(|field| match field {
            StoryField::Title => "📝 Título atualizado",
            StoryField::Content => "📖 Conteúdo atualizado",
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn error_embed(description: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("❌ Erro")
        .description(description)
        .color(COLOR_ERROR)
}

fn author_of(user: &serenity::User, prefix: &str) -> serenity::CreateEmbedAuthor {
    serenity::CreateEmbedAuthor::new(format!("{}{}", prefix, user.display_name()))
        .icon_url(user.face())
}

fn story_embed(story: &Story, author: &serenity::User) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(format!("📜 {}", story.title))
        .description(&story.content)
        .color(COLOR_STORY)
        .author(author_of(author, "Autor: "))
        .field("📅 Criada em", format_story_date(story.created_at), true)
        .field("✏️ Modificada em", format_story_date(story.updated_at), true)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "História de {}",
            story.username
        )))
}

async fn send_ephemeral(ctx: Context<'_>, embed: serenity::CreateEmbed) -> Result<(), Error> {
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

// ============================================================================
// COMMANDS
// ============================================================================

/// Cria sua história de RPG
#[poise::command(slash_command, rename = "criar_historia")]
pub async fn create_story(
    ctx: Context<'_>,
    #[description = "Título da história"] titulo: String,
    #[description = "Conteúdo da história"] conteudo: String,
) -> Result<(), Error> {
    if let Err(err) = Stories::validate_new(&titulo, &conteudo) {
        let text = validation_message(&err).unwrap_or("Dados inválidos.");
        return send_ephemeral(ctx, error_embed(text)).await;
    }

    ctx.defer_ephemeral().await?;

    let author = ctx.author();
    let new_story = NewStory {
        user_id: author.id.get(),
        username: author.name.clone(),
        title: titulo,
        content: conteudo,
    };

    let embed = match ctx.data().stories.create(new_story).await {
        Ok(story) => serenity::CreateEmbed::new()
            .title("✅ História Criada!")
            .description(format!(
                "**{}**\n\nSua história foi salva com sucesso!",
                story.title
            ))
            .color(COLOR_SUCCESS)
            .author(author_of(author, ""))
            .footer(serenity::CreateEmbedFooter::new(
                "Use /ler_historia para visualizá-la",
            )),
        Err(StoryError::AlreadyExists) => error_embed(
            "Você já possui uma história! Use `/editar_historia` para modificá-la \
             ou `/deletar_historia` para removê-la.",
        ),
        Err(err) if err.is_validation() => {
            error_embed(validation_message(&err).unwrap_or("Dados inválidos."))
        }
        Err(err) => {
            tracing::error!(user_id = author.id.get(), "Create story error: {}", err);
            error_embed(format!("Ocorreu um erro ao criar a história: {}", store_reason(&err)))
        }
    };

    send_ephemeral(ctx, embed).await
}

/// Lê uma história de RPG
#[poise::command(slash_command, rename = "ler_historia")]
pub async fn read_story(
    ctx: Context<'_>,
    #[description = "Usuário (deixe vazio para a sua)"] usuario: Option<serenity::User>,
) -> Result<(), Error> {
    let target = usuario.as_ref().unwrap_or_else(|| ctx.author());

    ctx.defer_ephemeral().await?;

    let embed = match ctx.data().stories.read(target.id.get()).await {
        Ok(Some(story)) => story_embed(&story, target),
        Ok(None) => serenity::CreateEmbed::new()
            .title("📖 História não encontrada")
            .description(format!(
                "**{}** ainda não criou uma história.",
                target.display_name()
            ))
            .color(COLOR_WARNING),
        Err(err) => {
            tracing::error!(user_id = target.id.get(), "Read story error: {}", err);
            error_embed("Ocorreu um erro ao ler a história. Tente novamente!")
        }
    };

    send_ephemeral(ctx, embed).await
}

/// Edita sua história de RPG
#[poise::command(slash_command, rename = "editar_historia")]
pub async fn edit_story(
    ctx: Context<'_>,
    #[description = "Novo título"] titulo: Option<String>,
    #[description = "Novo conteúdo"] conteudo: Option<String>,
) -> Result<(), Error> {
    let edit = StoryEdit::from_options(titulo, conteudo);

    if let Err(err) = Stories::validate_edit(&edit) {
        let text = validation_message(&err).unwrap_or("Dados inválidos.");
        return send_ephemeral(ctx, error_embed(text)).await;
    }

    ctx.defer_ephemeral().await?;

    let author = ctx.author();
    let user_id = author.id.get();

    let embed = match ctx.data().stories.edit(user_id, edit).await {
        Ok(outcome) => serenity::CreateEmbed::new()
            .title("✅ História Editada!")
            .description(format!(
                "**{}**\n\nSua história foi atualizada com sucesso!",
                outcome.story.title
            ))
            .color(COLOR_SUCCESS)
            .author(author_of(author, ""))
            .field("Alterações", describe_changes(&outcome.changed), false),
        Err(StoryError::NotFound) => {
            error_embed("Você ainda não possui uma história! Use `/criar_historia` primeiro.")
        }
        Err(err) if err.is_validation() => {
            error_embed(validation_message(&err).unwrap_or("Dados inválidos."))
        }
        Err(err) => {
            tracing::error!(user_id, "Edit story error: {}", err);
            error_embed(format!("Ocorreu um erro ao editar a história: {}", store_reason(&err)))
        }
    };

    send_ephemeral(ctx, embed).await
}

/// Deleta sua história de RPG
#[poise::command(slash_command, rename = "deletar_historia")]
pub async fn delete_story(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id.get();

    let story = match ctx.data().stories.find_for_deletion(user_id).await {
        Ok(story) => story,
        Err(StoryError::NotFound) => {
            return send_ephemeral(ctx, error_embed("Você não possui uma história para excluir!"))
                .await;
        }
        Err(err) => {
            tracing::error!(user_id, "Delete story lookup error: {}", err);
            return send_ephemeral(
                ctx,
                error_embed("Ocorreu um erro ao buscar a história. Tente novamente!"),
            )
            .await;
        }
    };

    // Ids are unique per invocation so an old prompt can't answer a new one.
    let confirm_id = format!("{}_confirm_delete", ctx.id());
    let cancel_id = format!("{}_cancel_delete", ctx.id());

    let prompt = serenity::CreateEmbed::new()
        .title("⚠️ Confirmar Exclusão")
        .description(format!(
            "Você tem certeza que deseja excluir sua história **\"{}\"**?\n\n\
             **Esta ação não pode ser desfeita!**",
            story.title
        ))
        .color(COLOR_WARNING);

    let buttons = vec![serenity::CreateActionRow::Buttons(vec![
        serenity::CreateButton::new(&confirm_id)
            .label("Confirmar")
            .emoji('🗑')
            .style(serenity::ButtonStyle::Danger),
        serenity::CreateButton::new(&cancel_id)
            .label("Cancelar")
            .emoji('❌')
            .style(serenity::ButtonStyle::Secondary),
    ])];

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(prompt)
                .components(buttons)
                .ephemeral(true),
        )
        .await?;
    let message_id = reply.message().await?.id;

    // Only the author may answer.
    let clicks = serenity::ComponentInteractionCollector::new(ctx)
        .author_id(ctx.author().id)
        .message_id(message_id)
        .timeout(DELETE_CONFIRM_TIMEOUT)
        .stream();

    let interaction = first_within(clicks, DELETE_CONFIRM_TIMEOUT).await;
    let choice = interaction.as_ref().map(|mci| {
        if mci.data.custom_id == confirm_id {
            DeleteChoice::Confirm
        } else {
            DeleteChoice::Cancel
        }
    });

    let outcome = ctx.data().stories.resolve_deletion(user_id, choice).await;

    let embed = match outcome {
        Ok(DeletionOutcome::Deleted) => serenity::CreateEmbed::new()
            .title("🗑️ História Excluída")
            .description("Sua história foi excluída com sucesso!")
            .color(COLOR_SUCCESS),
        Ok(DeletionOutcome::Cancelled) => serenity::CreateEmbed::new()
            .title("❌ Cancelado")
            .description("A exclusão foi cancelada.")
            .color(COLOR_NEUTRAL),
        Ok(DeletionOutcome::TimedOut) => serenity::CreateEmbed::new()
            .title("⏰ Tempo Esgotado")
            .description("A operação foi cancelada por tempo limite.")
            .color(COLOR_NEUTRAL),
        Err(err) => {
            tracing::error!(user_id, "Delete story error: {}", err);
            error_embed(format!(
                "Ocorreu um erro ao excluir a história: {}",
                store_reason(&err)
            ))
        }
    };

    match interaction {
        // Answer the click by rewriting the prompt in place.
        Some(mci) => {
            mci.create_response(
                ctx.http(),
                serenity::CreateInteractionResponse::UpdateMessage(
                    serenity::CreateInteractionResponseMessage::new()
                        .embed(embed)
                        .components(vec![]),
                ),
            )
            .await?;
        }
        None => {
            reply
                .edit(
                    ctx,
                    poise::CreateReply::default().embed(embed).components(vec![]),
                )
                .await?;
        }
    }

    Ok(())
}

/// Human-readable reason from a store failure.
fn store_reason(err: &StoryError) -> String {
    match err {
        StoryError::Store(inner) => inner.to_string(),
        other => other.to_string(),
    }
}
