//! In-memory gateway for query-layer tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::application::source::{ContentGateway, Fetched, PostFilter};
use crate::domain::posts::{Post, Rendered};
use crate::domain::slug::fold;

pub(crate) fn post(id: u64) -> Post {
    Post {
        id,
        slug: Some(format!("post-{id}")),
        title: Rendered {
            rendered: format!("Post {id}"),
        },
        excerpt: Rendered::default(),
        content: Rendered::default(),
        date: "2024-11-05T10:00:00".to_string(),
        categories: Vec::new(),
        categories_names: Vec::new(),
        link: None,
        featured_image: "/fallback.jpg".to_string(),
        author_name: None,
    }
}

pub(crate) fn posts(count: u64) -> Vec<Post> {
    (1..=count).map(post).collect()
}

/// Serves a fixed dataset, paginated like WordPress, and counts calls.
#[derive(Default)]
pub(crate) struct FakeGateway {
    latest: Vec<Post>,
    by_category: HashMap<u64, Vec<Post>>,
    categories: HashMap<String, u64>,
    delay: Duration,
    failing: AtomicBool,
    post_calls: AtomicUsize,
    slug_calls: AtomicUsize,
    resolve_calls: AtomicUsize,
}

impl FakeGateway {
    pub(crate) fn with_latest(latest: Vec<Post>) -> Self {
        Self {
            latest,
            ..Default::default()
        }
    }

    pub(crate) fn category(mut self, slug: &str, id: u64, posts: Vec<Post>) -> Self {
        self.categories.insert(fold(slug), id);
        self.by_category.insert(id, posts);
        self
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn post_calls(&self) -> usize {
        self.post_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn slug_calls(&self) -> usize {
        self.slug_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn resolve_calls(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl ContentGateway for FakeGateway {
    async fn fetch_posts(
        &self,
        filter: &PostFilter,
        page_size: u32,
        page: u32,
    ) -> Fetched<Vec<Post>> {
        self.post_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.failing.load(Ordering::SeqCst) {
            return Fetched::degraded(Vec::new());
        }

        let source: &[Post] = match filter {
            PostFilter::All | PostFilter::Search(_) => &self.latest,
            PostFilter::Category(id) => self.by_category.get(id).map_or(&[], Vec::as_slice),
        };
        let skip = (page.max(1) - 1) as usize * page_size as usize;
        Fetched::complete(
            source
                .iter()
                .skip(skip)
                .take(page_size as usize)
                .cloned()
                .collect(),
        )
    }

    async fn fetch_post_by_slug(&self, slug: &str) -> Fetched<Option<Post>> {
        self.slug_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if self.failing.load(Ordering::SeqCst) {
            return Fetched::degraded(None);
        }
        Fetched::complete(
            self.latest
                .iter()
                .find(|post| post.slug.as_deref() == Some(slug))
                .cloned(),
        )
    }

    async fn resolve_category_id(&self, slug: &str) -> Option<u64> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.categories.get(&fold(slug)).copied()
    }
}
