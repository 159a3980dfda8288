//! Canonical, site-relative URLs for posts.
//!
//! `build_post_url` is pure: no network, no cache, no clock.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use super::posts::Post;
use super::slug::permalink_slug;

/// Legacy permalink shape: `/{year}/{month}/{category}/{postname}/`.
static LEGACY_PERMALINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/(?P<year>\d{4})/(?P<month>\d{2})/(?P<category>[^/]+)/(?P<postname>[^/]+)/?$")
        .expect("legacy permalink pattern is valid")
});

/// Map a post to its canonical path.
///
/// Order: non-empty slug, then the `postname` segment of a legacy permalink,
/// then `/post/{id}`.
pub fn build_post_url(post: &Post) -> String {
    if let Some(slug) = post.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return format!("/{slug}");
    }

    if let Some(postname) = post.link.as_deref().and_then(legacy_postname) {
        return format!("/{postname}");
    }

    format!("/post/{}", post.id)
}

/// Extract the `postname` segment of a legacy permalink as a slug.
///
/// Accepts absolute URLs or bare paths. The segment is percent-decoded first,
/// so `engaño` and `enga%C3%B1o` map to the same slug a post stores.
pub fn legacy_postname(link: &str) -> Option<String> {
    let path = match Url::parse(link) {
        Ok(url) => url.path().to_string(),
        Err(_) => link.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    let captures = LEGACY_PERMALINK.captures(&path)?;
    permalink_slug(captures.name("postname")?.as_str())
}
