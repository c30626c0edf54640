use std::collections::BTreeMap;

use macrobot_core::{
    ChannelId, MacroError, MacroValue, MessageId, MessageStore, PageQuery, MAX_PAGE_SIZE,
};

use crate::extract::extract_macro;

/// Result of walking a channel's history: the newest message seen and
/// every macro definition found, keyed by name. Value order per name is
/// discovery order within the scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOutcome {
    pub watermark: Option<MessageId>,
    pub macros: BTreeMap<String, Vec<MacroValue>>,
}

/// Walks `channel` newest-to-oldest in pages of up to [`MAX_PAGE_SIZE`]
/// messages, collecting macro definitions.
///
/// Without `lower_bound` the walk covers the entire history; with it,
/// only messages strictly newer than the bound are visited. The
/// watermark is the id of the first message of the first page, captured
/// once. A page fetch failure aborts the whole scan; no partial result
/// is returned.
pub async fn scan_channel(
    store: &dyn MessageStore,
    channel: ChannelId,
    lower_bound: Option<MessageId>,
) -> Result<ScanOutcome, MacroError> {
    let mut outcome = ScanOutcome::default();
    let mut before = None;

    loop {
        let page = store
            .fetch_page(
                channel,
                PageQuery {
                    limit: MAX_PAGE_SIZE,
                    before,
                    after: lower_bound,
                },
            )
            .await
            .map_err(MacroError::UpstreamFetch)?;

        if outcome.watermark.is_none() {
            outcome.watermark = page.first().map(|message| message.id);
        }

        for message in &page {
            if let Some((name, value)) = extract_macro(message) {
                outcome.macros.entry(name).or_default().push(value);
            }
        }

        // A short page means the history (or the new-message window) is
        // exhausted.
        if page.len() < MAX_PAGE_SIZE {
            return Ok(outcome);
        }
        before = page.last().map(|message| message.id);
    }
}
