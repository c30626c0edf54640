use macrobot_core::{trigger, MacroValue, StoredMessage};

/// Classifies one message as a macro definition.
///
/// A message is a definition candidate when it carries at least one
/// attachment or its text is a link macro; it contributes nothing
/// without a parseable trigger token. Attachments win over a link when
/// a message somehow carries both, and all of a message's attachments
/// collapse into one `AttachmentSet` entry.
pub fn extract_macro(message: &StoredMessage) -> Option<(String, MacroValue)> {
    let link = trigger::link_url(&message.text);
    if message.attachments.is_empty() && link.is_none() {
        return None;
    }

    let name = trigger::trigger_name(&message.text)?;
    if !message.attachments.is_empty() {
        return Some((name, MacroValue::attachment_set(message.attachments.clone())));
    }

    link.map(|url| (name, MacroValue::link(url)))
}
