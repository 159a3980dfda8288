//! Newsdesk cache layer.
//!
//! A single TTL-keyed, LRU-bounded store shared by every feed. Keys are
//! canonical strings (see [`CacheKey`]) so editorial changes can be pushed
//! through with prefix invalidation:
//!
//! ```toml
//! [cache]
//! post_list_ttl_seconds = 3600
//! post_ttl_seconds = 86400
//! taxonomy_ttl_seconds = 604800
//! stale_after_seconds = 300
//! ```

mod config;
mod keys;
pub(crate) mod lock;
mod store;

pub use config::{
    CacheConfig, DEFAULT_MAX_ENTRIES, DEFAULT_POST_LIST_TTL_SECS, DEFAULT_POST_TTL_SECS,
    DEFAULT_STALE_AFTER_SECS, DEFAULT_TAXONOMY_TTL_SECS,
};
pub use keys::{CacheKey, ResourceKind, WILDCARD};
pub use store::{Hit, TtlStore};
