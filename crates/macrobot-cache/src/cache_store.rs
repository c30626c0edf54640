use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use macrobot_core::{ChannelId, MacroError, MacroValue, MessageId, MessageStore};
use tokio::task::JoinHandle;

use crate::scan::scan_channel;

/// Per-channel cache state: every macro discovered so far and the id of
/// the newest message any scan has observed. Entries are replaced
/// wholesale on top-off and deleted wholesale on invalidation; readers
/// never observe a partially updated entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelCacheEntry {
    pub macros: BTreeMap<String, Vec<MacroValue>>,
    pub watermark: Option<MessageId>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MacroCacheConfig {
    /// Destroy an entry this long after the access that last refreshed
    /// it. `None` disables idle eviction.
    pub idle_eviction: Option<Duration>,
}

/// Process-wide map from channel to cached macros.
///
/// Cheap to clone; clones share state. Cold channels are backfilled in
/// full on first use, warm channels are topped off from their watermark
/// on every later lookup. Concurrent cold fetches of the same channel
/// may each run a full scan; both converge on the same content and the
/// last write wins.
#[derive(Clone)]
pub struct MacroCacheStore {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    store: Arc<dyn MessageStore>,
    idle_eviction: Option<Duration>,
    entries: Mutex<HashMap<ChannelId, ChannelCacheEntry>>,
    eviction_tasks: Mutex<HashMap<ChannelId, JoinHandle<()>>>,
}

impl CacheInner {
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<ChannelId, ChannelCacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_eviction_tasks(&self) -> MutexGuard<'_, HashMap<ChannelId, JoinHandle<()>>> {
        self.eviction_tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl MacroCacheStore {
    pub fn new(store: Arc<dyn MessageStore>, config: MacroCacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                store,
                idle_eviction: config.idle_eviction,
                entries: Mutex::new(HashMap::new()),
                eviction_tasks: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Returns the cached values for `name` in `channel`, backfilling
    /// the channel's history on first access and folding in newer
    /// messages on every later one. Unknown names yield an empty list,
    /// never an error.
    pub async fn fetch(
        &self,
        channel: ChannelId,
        name: &str,
    ) -> Result<Vec<MacroValue>, MacroError> {
        self.refresh(channel).await?;
        let entries = self.inner.lock_entries();
        Ok(entries
            .get(&channel)
            .and_then(|entry| entry.macros.get(name))
            .cloned()
            .unwrap_or_default())
    }

    /// Scans for messages newer than the stored watermark and merges
    /// them in. Does nothing for a channel that was never scanned; the
    /// next `fetch`/`warm` backfills it in full.
    pub async fn top_off(&self, channel: ChannelId) -> Result<(), MacroError> {
        let Some(entry) = self.entry(channel) else {
            return Ok(());
        };
        self.top_off_entry(channel, entry).await
    }

    /// Every cached name of `channel` containing `fragment`,
    /// backfilling the channel on demand.
    pub async fn search_names(
        &self,
        channel: ChannelId,
        fragment: &str,
    ) -> Result<Vec<String>, MacroError> {
        self.refresh(channel).await?;
        let entries = self.inner.lock_entries();
        Ok(entries
            .get(&channel)
            .map(|entry| {
                entry
                    .macros
                    .keys()
                    .filter(|name| name.contains(fragment))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    /// True when the channel has a live entry. Never triggers a scan.
    pub fn is_warm(&self, channel: ChannelId) -> bool {
        self.inner.lock_entries().contains_key(&channel)
    }

    /// Ensures the channel has a live entry without asking for a name.
    pub async fn warm(&self, channel: ChannelId) -> Result<(), MacroError> {
        self.refresh(channel).await
    }

    /// Drops the channel's entry, if any, and cancels its eviction
    /// task. Idempotent.
    pub fn destroy(&self, channel: ChannelId) {
        self.inner.lock_entries().remove(&channel);
        if let Some(task) = self.inner.lock_eviction_tasks().remove(&channel) {
            task.abort();
        }
    }

    pub(crate) fn entry(&self, channel: ChannelId) -> Option<ChannelCacheEntry> {
        self.inner.lock_entries().get(&channel).cloned()
    }

    async fn refresh(&self, channel: ChannelId) -> Result<(), MacroError> {
        match self.entry(channel) {
            None => {
                let outcome = scan_channel(self.inner.store.as_ref(), channel, None).await?;
                self.inner.lock_entries().insert(
                    channel,
                    ChannelCacheEntry {
                        macros: outcome.macros,
                        watermark: outcome.watermark,
                    },
                );
                self.schedule_eviction(channel);
                Ok(())
            }
            Some(entry) => self.top_off_entry(channel, entry).await,
        }
    }

    async fn top_off_entry(
        &self,
        channel: ChannelId,
        entry: ChannelCacheEntry,
    ) -> Result<(), MacroError> {
        let outcome = scan_channel(self.inner.store.as_ref(), channel, entry.watermark).await?;

        // An empty window leaves the committed entry untouched.
        if outcome.watermark.is_some() && outcome.watermark != entry.watermark {
            let mut macros = entry.macros;
            // Names found in the new window replace their old value
            // lists in full.
            macros.extend(outcome.macros);
            self.inner.lock_entries().insert(
                channel,
                ChannelCacheEntry {
                    macros,
                    watermark: outcome.watermark,
                },
            );
        }
        self.schedule_eviction(channel);
        Ok(())
    }

    fn schedule_eviction(&self, channel: ChannelId) {
        let Some(idle) = self.inner.idle_eviction else {
            return;
        };

        let inner = Arc::clone(&self.inner);
        let mut tasks = self.inner.lock_eviction_tasks();
        if let Some(previous) = tasks.remove(&channel) {
            previous.abort();
        }
        tasks.insert(
            channel,
            tokio::spawn(async move {
                tokio::time::sleep(idle).await;
                inner.lock_entries().remove(&channel);
                tracing::debug!(%channel, "evicted idle macro cache entry");
            }),
        );
    }
}
