//! Discord glue for the macro cache engine.
//!
//! Wires the serenity gateway into the engine: summon and definition
//! messages, edit/delete cache invalidation, slash-command execution
//! with autocomplete, and user-facing error rendering.

pub mod discord_runtime;
pub mod discord_store;
pub mod slash_commands;
pub mod user_messages;

pub use discord_runtime::{run_bot, MacroBotConfig, MacroBotHandler};
pub use discord_store::{is_macro_channel, DiscordChannelResolver, DiscordMessageStore};
pub use slash_commands::{filter_choices, is_macro_command};
pub use user_messages::{schedule_ephemeral, user_message};
