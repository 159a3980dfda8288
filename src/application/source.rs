//! Traits describing the content sources behind the query layer.

use async_trait::async_trait;
use newsdesk_api_types::WpPost;
use thiserror::Error;

use crate::domain::posts::{Category, Post};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid CMS URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("CMS responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode CMS response: {0}")]
    Decode(String),
}

impl SourceError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Query for `/wp/v2/posts`. Order is always `date desc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostsQuery {
    pub per_page: u32,
    pub page: u32,
    pub category: Option<u64>,
    pub slug: Option<String>,
    pub search: Option<String>,
}

impl PostsQuery {
    pub fn page(per_page: u32, page: u32) -> Self {
        Self {
            per_page,
            page,
            category: None,
            slug: None,
            search: None,
        }
    }
}

/// Query for `/wp/v2/categories`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryQuery {
    Slug(String),
    Search(String),
}

/// Raw post listing.
#[async_trait]
pub trait PostsSource: Send + Sync {
    async fn posts(&self, query: &PostsQuery) -> Result<Vec<WpPost>, SourceError>;
}

/// Raw taxonomy listing.
#[async_trait]
pub trait TaxonomySource: Send + Sync {
    async fn categories(&self, query: &CategoryQuery) -> Result<Vec<Category>, SourceError>;
}

/// Post filter as sent to the CMS, with categories already resolved to IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PostFilter {
    All,
    Category(u64),
    Search(String),
}

/// A gateway result. Degraded values stand in for a failed fetch and must
/// not be cached, so the next request retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<T> {
    pub value: T,
    pub cacheable: bool,
}

impl<T> Fetched<T> {
    pub fn complete(value: T) -> Self {
        Self {
            value,
            cacheable: true,
        }
    }

    pub fn degraded(value: T) -> Self {
        Self {
            value,
            cacheable: false,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            value: f(self.value),
            cacheable: self.cacheable,
        }
    }
}

/// Normalized, failure-free content access used by the query manager.
///
/// Implementations absorb every error: failures come back as degraded empty
/// lists, `None` or not-found.
#[async_trait]
pub trait ContentGateway: Send + Sync {
    async fn fetch_posts(
        &self,
        filter: &PostFilter,
        page_size: u32,
        page: u32,
    ) -> Fetched<Vec<Post>>;

    async fn fetch_post_by_slug(&self, slug: &str) -> Fetched<Option<Post>>;

    async fn resolve_category_id(&self, slug: &str) -> Option<u64>;
}
