//! Cache configuration.
//!
//! TTLs per resource kind, the staleness window for background refresh and
//! the capacity bound of the in-memory store.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

use super::keys::ResourceKind;

pub const DEFAULT_POST_LIST_TTL_SECS: u64 = 60 * 60;
pub const DEFAULT_POST_TTL_SECS: u64 = 24 * 60 * 60;
pub const DEFAULT_TAXONOMY_TTL_SECS: u64 = 7 * 24 * 60 * 60;
pub const DEFAULT_STALE_AFTER_SECS: u64 = 5 * 60;
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of post lists, in seconds.
    pub post_list_ttl_secs: u64,
    /// Lifetime of single posts, in seconds.
    pub post_ttl_secs: u64,
    /// Lifetime of category resolutions, in seconds.
    pub taxonomy_ttl_secs: u64,
    /// Age after which a live entry is served once more and refreshed in the background.
    pub stale_after_secs: u64,
    /// Maximum number of entries before LRU eviction.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            post_list_ttl_secs: DEFAULT_POST_LIST_TTL_SECS,
            post_ttl_secs: DEFAULT_POST_TTL_SECS,
            taxonomy_ttl_secs: DEFAULT_TAXONOMY_TTL_SECS,
            stale_after_secs: DEFAULT_STALE_AFTER_SECS,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            post_list_ttl_secs: settings.post_list_ttl.as_secs(),
            post_ttl_secs: settings.post_ttl.as_secs(),
            taxonomy_ttl_secs: settings.taxonomy_ttl.as_secs(),
            stale_after_secs: settings.stale_after.as_secs(),
            max_entries: settings.max_entries.get(),
        }
    }
}

impl CacheConfig {
    pub fn ttl_for(&self, kind: ResourceKind) -> Duration {
        let secs = match kind {
            ResourceKind::PostList => self.post_list_ttl_secs,
            ResourceKind::Post => self.post_ttl_secs,
            ResourceKind::Taxonomy => self.taxonomy_ttl_secs,
        };
        Duration::from_secs(secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    /// Returns the capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn max_entries_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.max_entries).unwrap_or(NonZeroUsize::MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ttl_table() {
        let config = CacheConfig::default();
        assert_eq!(
            config.ttl_for(ResourceKind::PostList),
            Duration::from_secs(3600)
        );
        assert_eq!(config.ttl_for(ResourceKind::Post), Duration::from_secs(86_400));
        assert_eq!(
            config.ttl_for(ResourceKind::Taxonomy),
            Duration::from_secs(604_800)
        );
        assert_eq!(config.stale_after(), Duration::from_secs(300));
        assert_eq!(config.max_entries, 1000);
    }

    #[test]
    fn non_zero_clamps_to_min() {
        let config = CacheConfig {
            max_entries: 0,
            ..Default::default()
        };
        assert_eq!(config.max_entries_non_zero().get(), 1);
    }
}
