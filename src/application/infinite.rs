//! Infinite-scroll pagination over a feed.

use crate::application::query::{FeedFilter, PostList, QueryManager};
use crate::domain::posts::Post;

/// Pages fetched so far for one feed, numbered from 1.
///
/// Every page goes through the [`QueryManager`] cache keyed by its page
/// number, so a restarted query replays cached pages without network calls.
pub struct InfiniteQuery {
    manager: QueryManager,
    filter: FeedFilter,
    page_size: u32,
    pages: Vec<PostList>,
}

impl InfiniteQuery {
    pub(crate) fn new(manager: QueryManager, filter: FeedFilter, page_size: u32) -> Self {
        Self {
            manager,
            filter,
            page_size,
            pages: Vec::new(),
        }
    }

    pub fn filter(&self) -> &FeedFilter {
        &self.filter
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// False once the last fetched page came back short.
    pub fn has_more(&self) -> bool {
        self.pages
            .last()
            .is_none_or(|page| page.len() >= self.page_size as usize)
    }

    /// Fetch the next page. Returns `false` without fetching when exhausted.
    pub async fn fetch_next(&mut self) -> bool {
        if !self.has_more() {
            return false;
        }
        let next = self.pages.len() as u32 + 1;
        let page = self.manager.page(&self.filter, self.page_size, next).await;
        self.pages.push(page);
        true
    }

    /// Fetch until `count` pages are loaded or the feed runs out.
    pub async fn load_pages(&mut self, count: usize) -> usize {
        while self.pages.len() < count && self.fetch_next().await {}
        self.pages.len()
    }

    pub fn pages(&self) -> &[PostList] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All fetched posts, in page order.
    pub fn items(&self) -> Vec<Post> {
        self.pages
            .iter()
            .flat_map(|page| page.iter().cloned())
            .collect()
    }

    pub fn restart(&mut self) {
        self.pages.clear();
    }
}
