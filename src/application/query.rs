//! Query and pagination manager.
//!
//! Sits between callers and the [`ContentGateway`]: derives cache keys,
//! serves fresh entries from the [`TtlStore`], serves stale entries while a
//! background refresh runs, and coalesces concurrent fetches of one key.
//!
//! Fetches are spawned onto the runtime and tracked per cache key. Late
//! callers attach to the pending fetch, and the fetch still completes and
//! populates the cache when every caller has gone away.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use metrics::counter;
use tracing::{debug, warn};

use crate::application::gateway::MAX_PAGE_SIZE;
use crate::application::infinite::InfiniteQuery;
use crate::application::source::{ContentGateway, Fetched, PostFilter};
use crate::cache::{CacheConfig, CacheKey, ResourceKind, TtlStore, WILDCARD};
use crate::domain::posts::Post;
use crate::domain::slug::fold;

const SOURCE: &str = "application::query";

/// Immutable list of posts shared between the cache and callers.
pub type PostList = Arc<[Post]>;

/// Logical feed selection, before category slugs are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedFilter {
    All,
    Category(String),
    Search(String),
}

impl FeedFilter {
    /// Scope segment of the cache key for this feed.
    pub fn scope(&self) -> String {
        match self {
            FeedFilter::All => WILDCARD.to_string(),
            FeedFilter::Category(slug) => format!("cat={}", fold(slug)),
            FeedFilter::Search(text) => format!("q={}", text.trim().to_lowercase()),
        }
    }
}

#[derive(Debug, Clone)]
pub enum CachedValue {
    Posts(PostList),
    Post(Option<Arc<Post>>),
    Category(Option<u64>),
}

impl CachedValue {
    fn empty(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::PostList => CachedValue::Posts(empty_list()),
            ResourceKind::Post => CachedValue::Post(None),
            ResourceKind::Taxonomy => CachedValue::Category(None),
        }
    }

    fn into_posts(self) -> PostList {
        match self {
            CachedValue::Posts(posts) => posts,
            _ => empty_list(),
        }
    }

    fn into_post(self) -> Option<Post> {
        match self {
            CachedValue::Post(post) => post.map(|post| Post::clone(&post)),
            _ => None,
        }
    }

    fn into_category(self) -> Option<u64> {
        match self {
            CachedValue::Category(id) => id,
            _ => None,
        }
    }
}

fn empty_list() -> PostList {
    Arc::from(Vec::new())
}

/// Clamp a requested page size to what the CMS accepts.
pub fn clamp_page_size(page_size: u32) -> u32 {
    page_size.clamp(1, MAX_PAGE_SIZE)
}

type SharedFetch = Shared<BoxFuture<'static, CachedValue>>;

struct Inner {
    gateway: Arc<dyn ContentGateway>,
    store: TtlStore<CachedValue>,
    config: CacheConfig,
    inflight: DashMap<String, SharedFetch>,
}

#[derive(Clone)]
pub struct QueryManager {
    inner: Arc<Inner>,
}

impl QueryManager {
    pub fn new(gateway: Arc<dyn ContentGateway>, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                gateway,
                store: TtlStore::new(&config),
                config,
                inflight: DashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Number of live and not-yet-pruned cache entries.
    pub fn cached_entries(&self) -> usize {
        self.inner.store.len()
    }

    /// First page of a feed, cached as a single aggregate.
    pub async fn posts(&self, filter: &FeedFilter, page_size: u32) -> PostList {
        let page_size = clamp_page_size(page_size);
        let key = CacheKey::post_list(&filter.scope(), page_size);
        let filter = filter.clone();
        self.load(key, move |manager: QueryManager| {
            async move { manager.fetch_page(filter, page_size, 1).await }.boxed()
        })
        .await
        .into_posts()
    }

    /// One page of a feed, cached per page number.
    pub async fn page(&self, filter: &FeedFilter, page_size: u32, page: u32) -> PostList {
        let page_size = clamp_page_size(page_size);
        let page = page.max(1);
        let key = CacheKey::post_page(&filter.scope(), page_size, page);
        let filter = filter.clone();
        self.load(key, move |manager: QueryManager| {
            async move { manager.fetch_page(filter, page_size, page).await }.boxed()
        })
        .await
        .into_posts()
    }

    pub async fn latest_posts(&self, page_size: u32) -> PostList {
        self.posts(&FeedFilter::All, page_size).await
    }

    /// Posts of the category named by `slug`; an unknown category is an
    /// empty list.
    pub async fn posts_by_category_slug(&self, slug: &str, page_size: u32) -> PostList {
        self.posts(&FeedFilter::Category(slug.to_string()), page_size)
            .await
    }

    pub async fn search_posts(&self, text: &str, page_size: u32) -> PostList {
        if text.trim().is_empty() {
            return empty_list();
        }
        self.posts(&FeedFilter::Search(text.to_string()), page_size)
            .await
    }

    /// A growing, restartable sequence of pages for `filter`.
    pub fn infinite(&self, filter: FeedFilter, page_size: u32) -> InfiniteQuery {
        InfiniteQuery::new(self.clone(), filter, clamp_page_size(page_size))
    }

    /// Single post by slug. Misses are not cached, so a post published later
    /// shows up on the next request.
    pub async fn post_by_slug(&self, slug: &str) -> Option<Post> {
        let slug = slug.trim().to_string();
        if slug.is_empty() {
            return None;
        }

        let key = CacheKey::post(&slug);
        self.load(key, move |manager: QueryManager| {
            async move {
                let fetched = manager.inner.gateway.fetch_post_by_slug(&slug).await;
                let found = fetched.value.is_some();
                Fetched {
                    cacheable: fetched.cacheable && found,
                    value: CachedValue::Post(fetched.value.map(Arc::new)),
                }
            }
            .boxed()
        })
        .await
        .into_post()
    }

    /// Category ID for `slug`. Only successful resolutions are cached.
    pub async fn category_id(&self, slug: &str) -> Option<u64> {
        let slug = slug.trim().to_string();
        if slug.is_empty() {
            return None;
        }

        let key = CacheKey::category(&slug);
        self.load(key, move |manager: QueryManager| {
            async move {
                let id = manager.inner.gateway.resolve_category_id(&slug).await;
                Fetched {
                    cacheable: id.is_some(),
                    value: CachedValue::Category(id),
                }
            }
            .boxed()
        })
        .await
        .into_category()
    }

    /// Drop every cached page of a category feed and its resolution.
    pub fn invalidate_category(&self, slug: &str) -> usize {
        let scope = FeedFilter::Category(slug.to_string()).scope();
        let lists = self
            .inner
            .store
            .invalidate(&CacheKey::scope_prefix(ResourceKind::PostList, &scope));
        let taxonomy = self
            .inner
            .store
            .invalidate(&CacheKey::category(slug).to_string());
        lists + taxonomy
    }

    pub fn invalidate_post(&self, slug: &str) -> usize {
        self.inner
            .store
            .invalidate(&CacheKey::post(slug).to_string())
    }

    /// Remove every entry whose canonical key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.inner.store.invalidate(prefix)
    }

    pub fn invalidate_all(&self) {
        self.inner.store.clear();
    }

    async fn fetch_page(
        &self,
        filter: FeedFilter,
        page_size: u32,
        page: u32,
    ) -> Fetched<CachedValue> {
        let post_filter = match filter {
            FeedFilter::All => PostFilter::All,
            FeedFilter::Search(text) => PostFilter::Search(text.trim().to_string()),
            FeedFilter::Category(slug) => match self.category_id(&slug).await {
                Some(id) => PostFilter::Category(id),
                None => {
                    debug!(source = SOURCE, slug = %slug, "unknown category, empty feed");
                    return Fetched::degraded(CachedValue::Posts(empty_list()));
                }
            },
        };

        self.inner
            .gateway
            .fetch_posts(&post_filter, page_size, page)
            .await
            .map(|posts| CachedValue::Posts(posts.into()))
    }

    async fn load<F>(&self, key: CacheKey, fetch: F) -> CachedValue
    where
        F: FnOnce(QueryManager) -> BoxFuture<'static, Fetched<CachedValue>> + Send,
    {
        let cache_key = key.to_string();

        if let Some(hit) = self.inner.store.get(&cache_key) {
            if hit.age < self.inner.config.stale_after() {
                counter!("newsdesk_cache_hit_total").increment(1);
                return hit.value;
            }

            counter!("newsdesk_cache_stale_total").increment(1);
            debug!(source = SOURCE, key = %cache_key, "stale entry served, refreshing");
            let _refresh = self.in_flight(key.kind(), cache_key, fetch);
            return hit.value;
        }

        counter!("newsdesk_cache_miss_total").increment(1);
        self.in_flight(key.kind(), cache_key, fetch).await
    }

    /// Join the pending fetch for `cache_key`, or start one.
    fn in_flight<F>(&self, kind: ResourceKind, cache_key: String, fetch: F) -> SharedFetch
    where
        F: FnOnce(QueryManager) -> BoxFuture<'static, Fetched<CachedValue>>,
    {
        match self.inner.inflight.entry(cache_key) {
            Entry::Occupied(pending) => {
                counter!("newsdesk_fetch_dedup_total").increment(1);
                debug!(source = SOURCE, key = %pending.key(), "joined in-flight fetch");
                pending.get().clone()
            }
            Entry::Vacant(slot) => {
                let cache_key = slot.key().clone();
                let request = fetch(self.clone());
                let ttl = self.inner.config.ttl_for(kind);

                let inner = Arc::clone(&self.inner);
                let task_key = cache_key.clone();
                let task = tokio::spawn(async move {
                    let fetched = request.await;
                    if fetched.cacheable {
                        inner.store.put(task_key.clone(), fetched.value.clone(), ttl);
                    }
                    inner.inflight.remove(&task_key);
                    fetched.value
                });

                let inner = Arc::clone(&self.inner);
                let shared = async move {
                    match task.await {
                        Ok(value) => value,
                        Err(err) => {
                            warn!(source = SOURCE, key = %cache_key, error = %err, "fetch task failed");
                            inner.inflight.remove(&cache_key);
                            CachedValue::empty(kind)
                        }
                    }
                }
                .boxed()
                .shared();

                slot.insert(shared.clone());
                shared
            }
        }
    }
}
