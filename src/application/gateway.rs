//! Posts gateway: REST calls, normalization and the error policy.
//!
//! | outcome                         | result             | surfaced |
//! |---------------------------------|--------------------|----------|
//! | 2xx (possibly empty body)       | normalized posts   | no       |
//! | 400 on a list query             | empty list         | no       |
//! | other status, transport, decode | empty list / None  | notice   |

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use tracing::{debug, warn};

use crate::application::notice::{Notice, Notifier};
use crate::application::resolver::CategoryResolver;
use crate::application::source::{
    ContentGateway, Fetched, PostFilter, PostsQuery, PostsSource, SourceError,
};
use crate::domain::posts::Post;

const SOURCE: &str = "application::gateway";
/// Largest `per_page` the WordPress REST API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;
const PAGE_OUT_OF_RANGE: u16 = 400;

#[derive(Clone)]
pub struct PostsGateway {
    posts: Arc<dyn PostsSource>,
    resolver: CategoryResolver,
    notifier: Arc<dyn Notifier>,
    fallback_image: String,
}

impl PostsGateway {
    pub fn new(
        posts: Arc<dyn PostsSource>,
        resolver: CategoryResolver,
        notifier: Arc<dyn Notifier>,
        fallback_image: impl Into<String>,
    ) -> Self {
        Self {
            posts,
            resolver,
            notifier,
            fallback_image: fallback_image.into(),
        }
    }

    pub async fn fetch_posts(&self, filter: &PostFilter, page_size: u32, page: u32) -> Vec<Post> {
        self.load_posts(filter, page_size, page).await.value
    }

    pub async fn fetch_post_by_slug(&self, slug: &str) -> Option<Post> {
        self.load_post_by_slug(slug).await.value
    }

    async fn load_posts(
        &self,
        filter: &PostFilter,
        page_size: u32,
        page: u32,
    ) -> Fetched<Vec<Post>> {
        let mut query = PostsQuery::page(page_size.clamp(1, MAX_PAGE_SIZE), page.max(1));
        match filter {
            PostFilter::All => {}
            PostFilter::Category(id) => query.category = Some(*id),
            PostFilter::Search(text) => query.search = Some(text.clone()),
        }

        match self.posts.posts(&query).await {
            Ok(raw) => Fetched::complete(self.normalize(raw)),
            Err(err) if err.status() == Some(PAGE_OUT_OF_RANGE) => {
                debug!(
                    source = SOURCE,
                    page = query.page,
                    per_page = query.per_page,
                    "page beyond available range"
                );
                Fetched::complete(Vec::new())
            }
            Err(err) => {
                self.report("load posts", &err);
                Fetched::degraded(Vec::new())
            }
        }
    }

    async fn load_post_by_slug(&self, slug: &str) -> Fetched<Option<Post>> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Fetched::complete(None);
        }

        let mut query = PostsQuery::page(1, 1);
        query.slug = Some(slug.to_string());

        match self.posts.posts(&query).await {
            Ok(raw) => Fetched::complete(self.normalize(raw).into_iter().next()),
            Err(err) => {
                self.report("load post", &err);
                Fetched::degraded(None)
            }
        }
    }

    fn normalize(&self, raw: Vec<newsdesk_api_types::WpPost>) -> Vec<Post> {
        raw.into_iter()
            .map(|post| Post::from_wire(post, &self.fallback_image))
            .collect()
    }

    fn report(&self, action: &str, err: &SourceError) {
        counter!("newsdesk_cms_error_total").increment(1);
        warn!(source = SOURCE, action, error = %err, "CMS request failed");
        self.notifier.notify(Notice::warning(
            SOURCE,
            format!("Could not {action} right now. Please try again later."),
        ));
    }
}

#[async_trait]
impl ContentGateway for PostsGateway {
    async fn fetch_posts(
        &self,
        filter: &PostFilter,
        page_size: u32,
        page: u32,
    ) -> Fetched<Vec<Post>> {
        self.load_posts(filter, page_size, page).await
    }

    async fn fetch_post_by_slug(&self, slug: &str) -> Fetched<Option<Post>> {
        self.load_post_by_slug(slug).await
    }

    async fn resolve_category_id(&self, slug: &str) -> Option<u64> {
        self.resolver.resolve_category_id(slug).await
    }
}
