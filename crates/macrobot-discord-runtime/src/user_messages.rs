//! User-facing renderings of macro errors and the ephemeral-reply
//! helper.

use std::sync::Arc;
use std::time::Duration;

use macrobot_core::MacroError;
use serenity::http::Http;
use serenity::model::channel::Message;

pub const NO_MACRO_CHANNEL_TEXT: &str = "You must have a macro channel to summon one. Make a \
    channel called 'macros' or add '@macrobot' to the channel topic.";
pub const MACRO_NOT_FOUND_TEXT: &str = "There's no macro with that name. Create a message with \
    '#' + your macro's name and attach a photo, video, link, or file.";

/// The instructional text shown to users for `error`, or `None` when
/// the failure is internal and belongs in the log only.
pub fn user_message(error: &MacroError) -> Option<&'static str> {
    match error {
        MacroError::NoMacroChannel => Some(NO_MACRO_CHANNEL_TEXT),
        MacroError::MacroNotFound { .. } => Some(MACRO_NOT_FOUND_TEXT),
        MacroError::UpstreamFetch(_) => None,
    }
}

/// Deletes `message` after `ttl`. Best effort; failures are logged.
pub fn schedule_ephemeral(http: Arc<Http>, message: Message, ttl: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(ttl).await;
        if let Err(error) = message.delete(&http).await {
            tracing::debug!(message = %message.id, %error, "ephemeral delete failed");
        }
    });
}
