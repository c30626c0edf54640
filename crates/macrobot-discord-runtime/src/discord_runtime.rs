//! Gateway runtime: summon/definition message handling, cache
//! invalidation, and slash-command dispatch.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use futures_util::future;
use macrobot_cache::{MacroCacheConfig, MacroCacheStore, MacroEngine};
use macrobot_core::{trigger, ChannelId, CommunityId, MacroError, MacroValue};
use serenity::builder::{
    CreateAttachment, CreateAutocompleteResponse, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateMessage,
};
use serenity::client::{Client, Context, EventHandler};
use serenity::http::Http;
use serenity::model::application::{CommandInteraction, Interaction};
use serenity::model::channel::Message;
use serenity::model::event::MessageUpdateEvent;
use serenity::model::gateway::{GatewayIntents, Ready};
use serenity::model::id::{ChannelId as DiscordChannelId, GuildId, MessageId as DiscordMessageId};

use crate::discord_store::{is_macro_channel, DiscordChannelResolver, DiscordMessageStore};
use crate::slash_commands::{
    filter_choices, install_commands, is_macro_command, MACRO_NAME_OPTION,
};
use crate::user_messages::{schedule_ephemeral, user_message};

/// How long instructional error replies stay visible.
const ERROR_REPLY_TTL: Duration = Duration::from_secs(120);

#[derive(Clone)]
pub struct MacroBotConfig {
    pub token: String,
    pub cache: MacroCacheConfig,
}

/// Builds the engine and runs the gateway client until it stops.
pub async fn run_bot(config: MacroBotConfig) -> Result<()> {
    let http = Arc::new(Http::new(&config.token));
    let store = Arc::new(DiscordMessageStore::new(Arc::clone(&http)));
    let resolver = Arc::new(DiscordChannelResolver::new(http));
    let cache = MacroCacheStore::new(store, config.cache);
    let engine = Arc::new(MacroEngine::new(resolver, cache));

    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(&config.token, intents)
        .event_handler(MacroBotHandler::new(engine))
        .await
        .context("failed to build discord client")?;
    client.start().await.context("discord client stopped")?;
    Ok(())
}

pub struct MacroBotHandler {
    engine: Arc<MacroEngine>,
}

impl MacroBotHandler {
    pub fn new(engine: Arc<MacroEngine>) -> Self {
        Self { engine }
    }

    async fn summon(
        &self,
        ctx: &Context,
        channel: DiscordChannelId,
        guild: GuildId,
        name: &str,
    ) -> Result<(), MacroError> {
        if let Err(error) = channel.broadcast_typing(&ctx.http).await {
            tracing::debug!(%channel, %error, "typing indicator failed");
        }

        let values = self
            .engine
            .fetch_all(CommunityId(guild.get()), name)
            .await?;
        if values.is_empty() {
            return Err(MacroError::MacroNotFound {
                name: name.to_string(),
            });
        }

        let sends = values
            .iter()
            .map(|value| send_macro_value(ctx, channel, value));
        for result in future::join_all(sends).await {
            if let Err(error) = result {
                tracing::error!(%channel, %error, "macro delivery failed");
            }
        }
        Ok(())
    }

    async fn report_message_error(
        &self,
        ctx: &Context,
        channel: DiscordChannelId,
        error: &MacroError,
    ) {
        let Some(text) = user_message(error) else {
            tracing::error!(%channel, %error, "macro lookup failed");
            return;
        };
        match channel
            .send_message(&ctx.http, CreateMessage::new().content(text))
            .await
        {
            Ok(reply) => schedule_ephemeral(Arc::clone(&ctx.http), reply, ERROR_REPLY_TTL),
            Err(error) => tracing::error!(%channel, %error, "error reply failed"),
        }
    }

    async fn handle_macro_command(&self, ctx: &Context, command: &CommandInteraction) {
        let Some(guild) = command.guild_id else {
            return;
        };
        let name = command
            .data
            .options
            .iter()
            .find(|option| option.name == MACRO_NAME_OPTION)
            .and_then(|option| option.value.as_str())
            .map(str::trim)
            .unwrap_or_default()
            .to_lowercase();

        if let Err(error) = self.run_macro_command(ctx, command, guild, &name).await {
            self.report_command_error(ctx, command, &error).await;
        }
    }

    async fn run_macro_command(
        &self,
        ctx: &Context,
        command: &CommandInteraction,
        guild: GuildId,
        name: &str,
    ) -> Result<(), MacroError> {
        if let Err(error) = command.channel_id.broadcast_typing(&ctx.http).await {
            tracing::debug!(channel = %command.channel_id, %error, "typing indicator failed");
        }

        let mut values = self
            .engine
            .fetch_all(CommunityId(guild.get()), name)
            .await?;
        if values.is_empty() {
            return Err(MacroError::MacroNotFound {
                name: name.to_string(),
            });
        }

        // The first value answers the interaction; the rest follow as
        // plain channel messages.
        let first = values.remove(0);
        if let Err(error) = respond_with_value(ctx, command, &first).await {
            tracing::error!(command = %command.data.name, %error, "interaction reply failed");
            return Ok(());
        }
        let sends = values
            .iter()
            .map(|value| send_macro_value(ctx, command.channel_id, value));
        for result in future::join_all(sends).await {
            if let Err(error) = result {
                tracing::error!(channel = %command.channel_id, %error, "macro delivery failed");
            }
        }
        Ok(())
    }

    async fn report_command_error(
        &self,
        ctx: &Context,
        command: &CommandInteraction,
        error: &MacroError,
    ) {
        let Some(text) = user_message(error) else {
            tracing::error!(command = %command.data.name, %error, "macro command failed");
            return;
        };
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(text)
                .ephemeral(true),
        );
        if let Err(error) = command.create_response(&ctx.http, response).await {
            tracing::error!(%error, "command error reply failed");
        }
    }

    async fn handle_macro_autocomplete(&self, ctx: &Context, command: &CommandInteraction) {
        let Some(guild) = command.guild_id else {
            return;
        };
        let community = CommunityId(guild.get());

        let warm = match self.engine.is_warm(community).await {
            Ok(warm) => warm,
            Err(error) => {
                tracing::debug!(%community, %error, "autocomplete warmth check failed");
                return;
            }
        };
        if !warm {
            // Backfilling can take many seconds and the platform expects
            // an answer within three; warm in the background and answer
            // with nothing this time.
            let engine = Arc::clone(&self.engine);
            tokio::spawn(async move {
                if let Err(error) = engine.warm_all(community).await {
                    tracing::warn!(%community, %error, "background warm failed");
                }
            });
            respond_with_choices(ctx, command, Vec::new()).await;
            return;
        }

        let fragment = command
            .data
            .autocomplete()
            .map(|option| option.value.to_lowercase())
            .unwrap_or_default();
        match self.engine.search_all(community, &fragment).await {
            Ok(names) => respond_with_choices(ctx, command, filter_choices(names)).await,
            Err(error) => tracing::debug!(%community, %error, "macro name search failed"),
        }
    }
}

#[async_trait]
impl EventHandler for MacroBotHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!(bot = %ready.user.name, "macrobot online");
        if let Err(error) = install_commands(&ctx).await {
            tracing::error!(%error, "slash command installation failed");
        }
    }

    async fn message(&self, ctx: Context, message: Message) {
        if message.author.bot {
            return;
        }
        let Some(guild) = message.guild_id else {
            return;
        };
        if !trigger::mentions_macro(&message.content) {
            return;
        }

        if !message.attachments.is_empty() || trigger::is_link_macro(&message.content) {
            // A definition was just posted; fold it into the channel's
            // cache when the channel hosts macros.
            if channel_hosts_macros(&ctx, message.channel_id).await {
                if let Err(error) = self
                    .engine
                    .top_off(ChannelId(message.channel_id.get()))
                    .await
                {
                    tracing::warn!(channel = %message.channel_id, %error, "macro top-off failed");
                }
            }
            return;
        }

        let Some(name) = trigger::trigger_name(&message.content) else {
            return;
        };
        if let Err(error) = self.summon(&ctx, message.channel_id, guild, &name).await {
            self.report_message_error(&ctx, message.channel_id, &error)
                .await;
        }
    }

    async fn message_update(
        &self,
        _ctx: Context,
        _old: Option<Message>,
        _new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        // Edits and deletes drop the whole channel entry; the next
        // query refills it.
        self.engine.invalidate(ChannelId(event.channel_id.get()));
    }

    async fn message_delete(
        &self,
        _ctx: Context,
        channel_id: DiscordChannelId,
        _deleted_message_id: DiscordMessageId,
        _guild_id: Option<GuildId>,
    ) {
        self.engine.invalidate(ChannelId(channel_id.get()));
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) if is_macro_command(&command.data.name) => {
                self.handle_macro_command(&ctx, &command).await;
            }
            Interaction::Autocomplete(command) if is_macro_command(&command.data.name) => {
                self.handle_macro_autocomplete(&ctx, &command).await;
            }
            _ => {}
        }
    }
}

async fn channel_hosts_macros(ctx: &Context, channel: DiscordChannelId) -> bool {
    match channel.to_channel(&ctx.http).await {
        Ok(channel) => channel
            .guild()
            .map(|channel| is_macro_channel(&channel.name, channel.topic.as_deref()))
            .unwrap_or(false),
        Err(error) => {
            tracing::debug!(%channel, %error, "channel lookup failed");
            false
        }
    }
}

async fn send_macro_value(
    ctx: &Context,
    channel: DiscordChannelId,
    value: &MacroValue,
) -> Result<()> {
    match value {
        MacroValue::Link { url } => {
            channel
                .send_message(&ctx.http, CreateMessage::new().content(url.as_str()))
                .await
                .context("failed to post link macro")?;
        }
        MacroValue::AttachmentSet { files } => {
            let mut message = CreateMessage::new();
            for file in files {
                let attachment = CreateAttachment::url(&ctx.http, &file.url)
                    .await
                    .with_context(|| format!("failed to mirror attachment {}", file.filename))?;
                message = message.add_file(attachment);
            }
            channel
                .send_message(&ctx.http, message)
                .await
                .context("failed to post attachment macro")?;
        }
    }
    Ok(())
}

async fn respond_with_value(
    ctx: &Context,
    command: &CommandInteraction,
    value: &MacroValue,
) -> Result<()> {
    let message = match value {
        MacroValue::Link { url } => CreateInteractionResponseMessage::new().content(url.as_str()),
        MacroValue::AttachmentSet { files } => {
            let mut message = CreateInteractionResponseMessage::new();
            for file in files {
                let attachment = CreateAttachment::url(&ctx.http, &file.url)
                    .await
                    .with_context(|| format!("failed to mirror attachment {}", file.filename))?;
                message = message.add_file(attachment);
            }
            message
        }
    };
    command
        .create_response(&ctx.http, CreateInteractionResponse::Message(message))
        .await
        .context("failed to reply to interaction")?;
    Ok(())
}

async fn respond_with_choices(ctx: &Context, command: &CommandInteraction, names: Vec<String>) {
    let mut response = CreateAutocompleteResponse::new();
    for name in names {
        response = response.add_string_choice(name.clone(), name);
    }
    if let Err(error) = command
        .create_response(&ctx.http, CreateInteractionResponse::Autocomplete(response))
        .await
    {
        tracing::debug!(%error, "autocomplete reply failed");
    }
}
