//! Cache key definitions.
//!
//! Every cache entry is addressed by the tuple
//! (resource kind, scope, page size, page number) rendered as
//! `{kind}:{scope}:{page_size}:{page}`, with `*` for absent dimensions. The
//! kind and scope come first so a prefix addresses every page of one feed.
//! Scopes are escaped (`%` → `%25`, `:` → `%3A`) so a slug or search text
//! can never reach into the next segment.

use std::fmt;

use crate::domain::slug::fold;

/// Placeholder for an absent key dimension.
pub const WILDCARD: &str = "*";

/// Escape a scope so it occupies exactly one key segment.
fn escape_scope(scope: &str) -> String {
    scope.replace('%', "%25").replace(':', "%3A")
}

/// Resource kinds, each with its own TTL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Lists of posts (feeds, category pages, searches).
    PostList,
    /// A single post looked up by slug.
    Post,
    /// Category slug → ID resolutions.
    Taxonomy,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::PostList => "posts",
            ResourceKind::Post => "post",
            ResourceKind::Taxonomy => "categories",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    kind: ResourceKind,
    scope: Option<String>,
    page_size: Option<u32>,
    page: Option<u32>,
}

impl CacheKey {
    /// Aggregate key for a single-page feed.
    pub fn post_list(scope: &str, page_size: u32) -> Self {
        Self {
            kind: ResourceKind::PostList,
            scope: Some(escape_scope(scope)),
            page_size: Some(page_size),
            page: None,
        }
    }

    /// Key for one page of an infinite feed.
    pub fn post_page(scope: &str, page_size: u32, page: u32) -> Self {
        Self {
            kind: ResourceKind::PostList,
            scope: Some(escape_scope(scope)),
            page_size: Some(page_size),
            page: Some(page),
        }
    }

    pub fn post(slug: &str) -> Self {
        Self {
            kind: ResourceKind::Post,
            scope: Some(escape_scope(slug.trim())),
            page_size: None,
            page: None,
        }
    }

    /// Category resolutions are keyed by folded slug so accented and plain
    /// spellings share an entry.
    pub fn category(slug: &str) -> Self {
        Self {
            kind: ResourceKind::Taxonomy,
            scope: Some(escape_scope(&fold(slug))),
            page_size: None,
            page: None,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn page(&self) -> Option<u32> {
        self.page
    }

    /// Prefix covering every entry of `kind` with the given scope.
    pub fn scope_prefix(kind: ResourceKind, scope: &str) -> String {
        format!("{kind}:{}:", escape_scope(scope))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:",
            self.kind,
            self.scope.as_deref().unwrap_or(WILDCARD)
        )?;
        match self.page_size {
            Some(size) => write!(f, "{size}:")?,
            None => write!(f, "{WILDCARD}:")?,
        }
        match self.page {
            Some(page) => write!(f, "{page}"),
            None => f.write_str(WILDCARD),
        }
    }
}
