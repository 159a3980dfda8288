//! Wire types for the WordPress REST API (`/wp-json/wp/v2`).
//!
//! These mirror the JSON envelope the CMS returns. Every nested field is
//! optional or defaulted: WordPress installations differ in which plugins and
//! embeds they expose, and a partially populated record must still decode.
//! Only a post's `id` is strict; a `null` or mistyped nested field falls back
//! to its default instead of rejecting the record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode a field, substituting `T::default()` for `null` or a mistyped value.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// A `{ "rendered": "<p>..</p>" }` wrapper used for titles, excerpts and content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpRendered {
    #[serde(default, deserialize_with = "lenient")]
    pub rendered: String,
}

/// One post object from `GET /wp-json/wp/v2/posts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WpPost {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient")]
    pub title: WpRendered,
    #[serde(default, deserialize_with = "lenient")]
    pub excerpt: WpRendered,
    #[serde(default, deserialize_with = "lenient")]
    pub content: WpRendered,
    #[serde(default, deserialize_with = "lenient")]
    pub categories: Vec<u64>,
    #[serde(default, rename = "_embedded", deserialize_with = "lenient")]
    pub embedded: Option<WpEmbedded>,
}

/// Side-loaded relations returned when the request carries `_embed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WpEmbedded {
    #[serde(default, deserialize_with = "lenient")]
    pub author: Vec<WpAuthor>,
    #[serde(default, rename = "wp:featuredmedia", deserialize_with = "lenient")]
    pub featured_media: Vec<WpMedia>,
    /// Term groups; index 0 holds categories, index 1 tags.
    #[serde(default, rename = "wp:term", deserialize_with = "lenient")]
    pub terms: Vec<Vec<WpTerm>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpAuthor {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

/// Featured media entry. Restricted media comes back as an error object
/// without `source_url`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpMedia {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub source_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpTerm {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub taxonomy: Option<String>,
}

/// One category object from `GET /wp-json/wp/v2/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpCategory {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub slug: String,
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub count: Option<u64>,
}
