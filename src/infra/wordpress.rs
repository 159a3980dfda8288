//! WordPress REST client.
//!
//! Thin transport over `/wp-json/wp/v2`: builds queries, maps HTTP failures
//! to [`SourceError`] and decodes records one by one so a single malformed
//! post does not sink its page.

use std::time::Duration;

use async_trait::async_trait;
use newsdesk_api_types::{WpCategory, WpPost};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::application::source::{
    CategoryQuery, PostsQuery, PostsSource, SourceError, TaxonomySource,
};
use crate::domain::posts::Category;

use super::error::InfraError;

const SOURCE: &str = "infra::wordpress";
const POSTS_PATH: &str = "wp-json/wp/v2/posts";
const CATEGORIES_PATH: &str = "wp-json/wp/v2/categories";

#[derive(Clone, Debug)]
pub struct WordPressClient {
    client: Client,
    base: Url,
}

impl WordPressClient {
    pub fn new(base_url: &Url, timeout: Option<Duration>) -> Result<Self, InfraError> {
        let mut builder = Client::builder().user_agent(Self::user_agent());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;

        Ok(Self {
            client,
            base: normalize_base(base_url),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("newsdesk/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn posts_url(&self, query: &PostsQuery) -> Result<Url, SourceError> {
        let mut url = self.base.join(POSTS_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_key_only("_embed");
            pairs.append_pair("per_page", &query.per_page.to_string());
            pairs.append_pair("page", &query.page.to_string());
            pairs.append_pair("orderby", "date");
            pairs.append_pair("order", "desc");
            if let Some(category) = query.category {
                pairs.append_pair("categories", &category.to_string());
            }
            if let Some(slug) = &query.slug {
                pairs.append_pair("slug", slug);
            }
            if let Some(search) = &query.search {
                pairs.append_pair("search", search);
            }
        }
        Ok(url)
    }

    fn categories_url(&self, query: &CategoryQuery) -> Result<Url, SourceError> {
        let mut url = self.base.join(CATEGORIES_PATH)?;
        let (key, value) = match query {
            CategoryQuery::Slug(slug) => ("slug", slug),
            CategoryQuery::Search(text) => ("search", text),
        };
        url.query_pairs_mut().append_pair(key, value);
        Ok(url)
    }

    async fn get_list<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, SourceError> {
        debug!(source = SOURCE, url = %url, "CMS request");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(SourceError::transport)?;
        Self::handle(resp).await
    }

    async fn handle<T: DeserializeOwned>(resp: Response) -> Result<Vec<T>, SourceError> {
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(SourceError::transport)?;
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        decode_records(&bytes)
    }
}

/// Keep the base path and make sure relative joins append to it.
fn normalize_base(base_url: &Url) -> Url {
    let mut base = base_url.clone();
    base.set_query(None);
    base.set_fragment(None);
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

/// Decode a JSON array record by record. An empty body is an empty list;
/// records that fail to decode (no usable `id`) are skipped.
fn decode_records<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>, SourceError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let raw: Vec<Value> = serde_json::from_slice(bytes).map_err(SourceError::decode)?;
    let total = raw.len();
    let records: Vec<T> = raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(source = SOURCE, error = %err, "skipping malformed CMS record");
                None
            }
        })
        .collect();

    if records.len() < total {
        debug!(
            source = SOURCE,
            kept = records.len(),
            total,
            "CMS page partially decoded"
        );
    }
    Ok(records)
}

#[async_trait]
impl PostsSource for WordPressClient {
    async fn posts(&self, query: &PostsQuery) -> Result<Vec<WpPost>, SourceError> {
        let url = self.posts_url(query)?;
        self.get_list(url).await
    }
}

#[async_trait]
impl TaxonomySource for WordPressClient {
    async fn categories(&self, query: &CategoryQuery) -> Result<Vec<Category>, SourceError> {
        let url = self.categories_url(query)?;
        let rows: Vec<WpCategory> = self.get_list(url).await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }
}
