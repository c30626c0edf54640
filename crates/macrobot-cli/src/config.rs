//! TOML settings for the macrobot binary.

use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use macrobot_cache::MacroCacheConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub production: Profile,
    #[serde(default)]
    pub dev: Option<Profile>,
    #[serde(default)]
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Minutes an entry may sit untouched before it is dropped.
    /// 0 disables idle eviction.
    #[serde(default = "default_idle_eviction_minutes")]
    pub idle_eviction_minutes: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            idle_eviction_minutes: default_idle_eviction_minutes(),
        }
    }
}

fn default_idle_eviction_minutes() -> u64 {
    10
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse settings file {}", path.display()))
    }

    pub fn profile(&self, dev: bool) -> Result<&Profile> {
        if !dev {
            return Ok(&self.production);
        }
        match &self.dev {
            Some(profile) => Ok(profile),
            None => bail!("settings file has no [dev] profile"),
        }
    }

    pub fn cache_config(&self) -> MacroCacheConfig {
        let minutes = self.cache.idle_eviction_minutes;
        MacroCacheConfig {
            idle_eviction: (minutes > 0).then(|| Duration::from_secs(minutes * 60)),
        }
    }
}
