use std::sync::Arc;

use futures_util::future;
use macrobot_core::{ChannelId, ChannelResolver, CommunityId, MacroError, MacroValue};

use crate::cache_store::MacroCacheStore;

/// Multi-channel aggregation facade over the cache store.
///
/// Every operation resolves the community's macro channels first and
/// fans out across them; per-channel results are concatenated in
/// resolution order.
pub struct MacroEngine {
    resolver: Arc<dyn ChannelResolver>,
    cache: MacroCacheStore,
}

impl MacroEngine {
    pub fn new(resolver: Arc<dyn ChannelResolver>, cache: MacroCacheStore) -> Self {
        Self { resolver, cache }
    }

    /// Looks up `name` across every macro channel of `community`. An
    /// empty result means no definition exists anywhere; callers decide
    /// whether that is an error.
    pub async fn fetch_all(
        &self,
        community: CommunityId,
        name: &str,
    ) -> Result<Vec<MacroValue>, MacroError> {
        let channels = self.resolver.resolve_macro_channels(community).await?;
        let per_channel = future::try_join_all(
            channels
                .iter()
                .map(|&channel| self.cache.fetch(channel, name)),
        )
        .await?;
        Ok(per_channel.into_iter().flatten().collect())
    }

    /// Collects every cached name containing `fragment` across the
    /// community's macro channels.
    pub async fn search_all(
        &self,
        community: CommunityId,
        fragment: &str,
    ) -> Result<Vec<String>, MacroError> {
        let channels = self.resolver.resolve_macro_channels(community).await?;
        let per_channel = future::try_join_all(
            channels
                .iter()
                .map(|&channel| self.cache.search_names(channel, fragment)),
        )
        .await?;
        Ok(per_channel.into_iter().flatten().collect())
    }

    /// True when every macro channel of `community` has a live cache
    /// entry. Never triggers a scan.
    pub async fn is_warm(&self, community: CommunityId) -> Result<bool, MacroError> {
        let channels = self.resolver.resolve_macro_channels(community).await?;
        Ok(channels.iter().all(|&channel| self.cache.is_warm(channel)))
    }

    /// Pre-populates every macro channel of `community`. Warming is
    /// advisory: per-channel failures are logged and swallowed.
    pub async fn warm_all(&self, community: CommunityId) -> Result<(), MacroError> {
        let channels = self.resolver.resolve_macro_channels(community).await?;
        let results =
            future::join_all(channels.iter().map(|&channel| self.cache.warm(channel))).await;
        for (channel, result) in channels.iter().zip(results) {
            if let Err(error) = result {
                tracing::warn!(%channel, %error, "macro cache warm failed");
            }
        }
        Ok(())
    }

    /// Folds messages newer than the channel's watermark into its
    /// entry. A no-op for channels never scanned.
    pub async fn top_off(&self, channel: ChannelId) -> Result<(), MacroError> {
        self.cache.top_off(channel).await
    }

    /// Drops the channel's cached entry in response to an external
    /// change signal.
    pub fn invalidate(&self, channel: ChannelId) {
        self.cache.destroy(channel);
    }
}
