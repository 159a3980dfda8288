//! Normalized post and category records.
//!
//! `Post` is the only shape handed to consumers. It is built from the raw
//! WordPress envelope at the gateway boundary, where missing embeds are
//! replaced by per-field defaults instead of rejecting the record.

use newsdesk_api_types::{WpCategory, WpEmbedded, WpPost, WpRendered};
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, format_description::well_known::Rfc3339};

/// Index of the category group inside `_embedded["wp:term"]`.
pub const CATEGORY_TERM_GROUP: usize = 0;

/// HTML fragment exactly as rendered by the CMS.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rendered {
    pub rendered: String,
}

impl From<WpRendered> for Rendered {
    fn from(value: WpRendered) -> Self {
        Self {
            rendered: value.rendered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    pub slug: Option<String>,
    pub title: Rendered,
    pub excerpt: Rendered,
    pub content: Rendered,
    pub date: String,
    pub categories: Vec<u64>,
    pub categories_names: Vec<String>,
    pub link: Option<String>,
    pub featured_image: String,
    pub author_name: Option<String>,
}

impl Post {
    /// Build a normalized post from the wire record.
    ///
    /// `fallback_image` is used when the post has no readable featured media.
    pub fn from_wire(raw: WpPost, fallback_image: &str) -> Self {
        let embedded = raw.embedded.unwrap_or_default();

        Self {
            id: raw.id,
            slug: non_blank(raw.slug),
            title: raw.title.into(),
            excerpt: raw.excerpt.into(),
            content: raw.content.into(),
            date: raw.date,
            categories: raw.categories,
            categories_names: category_names(&embedded),
            link: non_blank(raw.link),
            featured_image: featured_image(&embedded)
                .unwrap_or_else(|| fallback_image.to_string()),
            author_name: embedded
                .author
                .first()
                .and_then(|author| author.name.clone())
                .filter(|name| !name.trim().is_empty()),
        }
    }

    /// Publish timestamp parsed from `date`.
    ///
    /// WordPress emits site-local timestamps without an offset; RFC 3339 values
    /// are accepted too and reduced to their local date-time.
    pub fn published_at(&self) -> Option<PrimitiveDateTime> {
        let local = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
        PrimitiveDateTime::parse(&self.date, local).ok().or_else(|| {
            OffsetDateTime::parse(&self.date, &Rfc3339)
                .ok()
                .map(|value| PrimitiveDateTime::new(value.date(), value.time()))
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

fn category_names(embedded: &WpEmbedded) -> Vec<String> {
    embedded
        .terms
        .get(CATEGORY_TERM_GROUP)
        .map(|terms| {
            terms
                .iter()
                .filter_map(|term| term.name.clone())
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn featured_image(embedded: &WpEmbedded) -> Option<String> {
    embedded
        .featured_media
        .first()
        .and_then(|media| media.source_url.clone())
        .filter(|url| !url.trim().is_empty())
}

/// A taxonomy term from `/wp/v2/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub slug: String,
    pub name: String,
}

impl From<WpCategory> for Category {
    fn from(value: WpCategory) -> Self {
        Self {
            id: value.id,
            slug: value.slug,
            name: value.name,
        }
    }
}
