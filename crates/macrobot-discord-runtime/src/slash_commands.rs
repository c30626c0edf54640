//! `/macro` slash-command registration and choice shaping.

use anyhow::{Context as _, Result};
use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::client::Context;
use serenity::model::application::{Command, CommandOptionType};

pub const MACRO_COMMAND: &str = "macro";
pub const MACRO_COMMAND_ALIAS: &str = "m";
pub const MACRO_NAME_OPTION: &str = "name";

/// Discord caps autocomplete responses at 25 choices of under 100
/// characters each.
const AUTOCOMPLETE_CHOICE_CAP: usize = 25;
const CHOICE_MAX_LEN: usize = 100;

pub fn is_macro_command(name: &str) -> bool {
    name == MACRO_COMMAND || name == MACRO_COMMAND_ALIAS
}

fn build_macro_command(name: &str) -> CreateCommand {
    CreateCommand::new(name).description("Send a macro").add_option(
        CreateCommandOption::new(
            CommandOptionType::String,
            MACRO_NAME_OPTION,
            "The name of the macro to summon",
        )
        .min_length(1)
        .set_autocomplete(true)
        .required(true),
    )
}

/// Installs `/macro` and its `/m` alias as global commands.
pub async fn install_commands(ctx: &Context) -> Result<()> {
    Command::set_global_commands(
        &ctx.http,
        vec![
            build_macro_command(MACRO_COMMAND),
            build_macro_command(MACRO_COMMAND_ALIAS),
        ],
    )
    .await
    .context("failed to install slash commands")?;
    Ok(())
}

/// Drops names the platform would reject and applies the choice cap.
pub fn filter_choices(names: Vec<String>) -> Vec<String> {
    names
        .into_iter()
        .filter(|name| {
            if name.is_empty() {
                tracing::debug!("dropped empty autocomplete choice");
                return false;
            }
            if name.len() >= CHOICE_MAX_LEN {
                tracing::debug!(%name, "dropped oversized autocomplete choice");
                return false;
            }
            true
        })
        .take(AUTOCOMPLETE_CHOICE_CAP)
        .collect()
}
