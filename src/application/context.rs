//! Wiring of the content layer from resolved settings.

use std::sync::Arc;

use tracing::info;

use crate::application::gateway::PostsGateway;
use crate::application::notice::NoticeQueue;
use crate::application::query::QueryManager;
use crate::application::resolver::CategoryResolver;
use crate::cache::CacheConfig;
use crate::config::Settings;
use crate::infra::error::InfraError;
use crate::infra::wordpress::WordPressClient;

/// Everything a consumer needs: the cached query layer and the notices it
/// raises.
#[derive(Clone)]
pub struct ContentContext {
    pub query: QueryManager,
    pub notices: Arc<NoticeQueue>,
    pub default_page_size: u32,
}

impl ContentContext {
    pub fn build(settings: &Settings) -> Result<Self, InfraError> {
        let client = Arc::new(WordPressClient::new(
            &settings.cms.base_url,
            settings.cms.request_timeout,
        )?);
        let notices = Arc::new(NoticeQueue::new());

        let resolver = CategoryResolver::new(client.clone());
        let gateway = PostsGateway::new(
            client.clone(),
            resolver,
            notices.clone(),
            settings.feed.fallback_image_url.clone(),
        );
        let query = QueryManager::new(Arc::new(gateway), CacheConfig::from(&settings.cache));

        info!(
            cms = %client.base_url(),
            max_entries = settings.cache.max_entries.get(),
            "content layer ready"
        );

        Ok(Self {
            query,
            notices,
            default_page_size: settings.feed.default_page_size,
        })
    }
}
