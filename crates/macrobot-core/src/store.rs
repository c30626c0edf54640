use anyhow::Result;
use async_trait::async_trait;

use crate::error::MacroError;
use crate::ids::{ChannelId, CommunityId};
use crate::message::{PageQuery, StoredMessage};

/// Trait contract for the remote message store consumed by the scanner.
///
/// Pages are returned newest-first. Implementations honor `limit` (at
/// most [`crate::MAX_PAGE_SIZE`]) and the exclusive `before`/`after`
/// bounds of the query.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn fetch_page(
        &self,
        channel: ChannelId,
        query: PageQuery,
    ) -> Result<Vec<StoredMessage>>;
}

/// Trait contract for resolving which channels of a community host
/// macro definitions.
#[async_trait]
pub trait ChannelResolver: Send + Sync {
    /// Returns the macro-hosting channels of `community`, in a stable
    /// order, or [`MacroError::NoMacroChannel`] when there are none.
    async fn resolve_macro_channels(
        &self,
        community: CommunityId,
    ) -> Result<Vec<ChannelId>, MacroError>;
}
