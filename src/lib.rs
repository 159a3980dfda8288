//! Content-access layer for a WordPress-backed news site.
//!
//! Raw WordPress REST responses go in; normalized [`Post`] records, resolved
//! category IDs and canonical URLs come out, served through a TTL cache with
//! in-flight deduplication.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;

pub use application::gateway::PostsGateway;
pub use application::infinite::InfiniteQuery;
pub use application::query::{FeedFilter, PostList, QueryManager};
pub use application::resolver::CategoryResolver;
pub use domain::posts::{Category, Post};
pub use domain::url::build_post_url;
