//! Serenity-backed implementations of the message-store seams.

use std::sync::Arc;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serenity::builder::GetMessages;
use serenity::http::Http;
use serenity::model::channel::ChannelType;

use macrobot_core::{
    ChannelId, ChannelResolver, CommunityId, FileReference, MacroError, MessageId, MessageStore,
    PageQuery, StoredMessage,
};

/// Channels named this host macro definitions.
pub const MACRO_CHANNEL_NAME: &str = "macros";
/// So do channels carrying this tag in their topic.
pub const MACRO_CHANNEL_TOPIC_TAG: &str = "@macrobot";

/// True when a text channel with `name` and `topic` hosts macro
/// definitions.
pub fn is_macro_channel(name: &str, topic: Option<&str>) -> bool {
    name.eq_ignore_ascii_case(MACRO_CHANNEL_NAME)
        || topic.is_some_and(|topic| topic.to_lowercase().contains(MACRO_CHANNEL_TOPIC_TAG))
}

/// Message-history pages served by the Discord REST API.
pub struct DiscordMessageStore {
    http: Arc<Http>,
}

impl DiscordMessageStore {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MessageStore for DiscordMessageStore {
    async fn fetch_page(
        &self,
        channel: ChannelId,
        query: PageQuery,
    ) -> Result<Vec<StoredMessage>> {
        let mut request = GetMessages::new().limit(query.limit.min(u8::MAX as usize) as u8);
        if let Some(before) = query.before {
            request = request.before(serenity::model::id::MessageId::new(before.0));
        }

        let messages = serenity::model::id::ChannelId::new(channel.0)
            .messages(&self.http, request)
            .await
            .with_context(|| format!("failed to fetch messages for channel {channel}"))?;

        let mut page: Vec<StoredMessage> = messages.into_iter().map(stored_message).collect();
        if let Some(after) = query.after {
            // Discord honors a single cursor per request; the newer-than
            // bound is applied here instead.
            page.retain(|message| message.id > after);
        }
        Ok(page)
    }
}

fn stored_message(message: serenity::model::channel::Message) -> StoredMessage {
    StoredMessage {
        id: MessageId(message.id.get()),
        text: message.content,
        attachments: message
            .attachments
            .into_iter()
            .map(|attachment| FileReference {
                id: attachment.id.get().to_string(),
                filename: attachment.filename,
                url: attachment.url,
            })
            .collect(),
    }
}

/// Resolves a guild's macro channels through the Discord REST API.
pub struct DiscordChannelResolver {
    http: Arc<Http>,
}

impl DiscordChannelResolver {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ChannelResolver for DiscordChannelResolver {
    async fn resolve_macro_channels(
        &self,
        community: CommunityId,
    ) -> Result<Vec<ChannelId>, MacroError> {
        let channels = serenity::model::id::GuildId::new(community.0)
            .channels(&self.http)
            .await
            .map_err(|error| MacroError::UpstreamFetch(error.into()))?;

        let mut resolved: Vec<ChannelId> = channels
            .values()
            .filter(|channel| channel.kind == ChannelType::Text)
            .filter(|channel| is_macro_channel(&channel.name, channel.topic.as_deref()))
            .map(|channel| ChannelId(channel.id.get()))
            .collect();
        // Stable aggregation order regardless of API map ordering.
        resolved.sort();

        if resolved.is_empty() {
            return Err(MacroError::NoMacroChannel);
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::is_macro_channel;

    #[test]
    fn macro_channels_match_by_name_or_topic_tag() {
        assert!(is_macro_channel("macros", None));
        assert!(is_macro_channel("MACROS", None));
        assert!(is_macro_channel("general", Some("reaction gifs, @Macrobot lives here")));
        assert!(!is_macro_channel("general", Some("just chatter")));
        assert!(!is_macro_channel("general", None));
        assert!(!is_macro_channel("macros-archive", None));
    }
}
