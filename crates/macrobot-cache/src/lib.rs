//! Macro cache engine: lazy history backfill, watermark-based top-off,
//! name search, and multi-channel aggregation.
//!
//! Channel histories are scanned newest-to-oldest in bounded pages on
//! first access; later accesses fetch only messages newer than the
//! channel's watermark. Edit/delete signals drop a channel's entry
//! wholesale and the next lookup rebuilds it.

pub mod cache_store;
pub mod engine;
pub mod extract;
pub mod scan;

pub use cache_store::{ChannelCacheEntry, MacroCacheConfig, MacroCacheStore};
pub use engine::MacroEngine;
pub use extract::extract_macro;
pub use scan::{scan_channel, ScanOutcome};
