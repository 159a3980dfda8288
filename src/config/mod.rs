//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroUsize, str::FromStr, time::Duration};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::gateway::MAX_PAGE_SIZE;
use crate::cache::{
    DEFAULT_MAX_ENTRIES, DEFAULT_POST_LIST_TTL_SECS, DEFAULT_POST_TTL_SECS,
    DEFAULT_STALE_AFTER_SECS, DEFAULT_TAXONOMY_TTL_SECS,
};

mod cli;

pub use cli::{CategoryArgs, CliArgs, Command, ListArgs, SearchArgs, SettingsOverrides, SlugArgs};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "newsdesk";
const ENV_PREFIX: &str = "NEWSDESK";
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_FALLBACK_IMAGE_URL: &str = "/images/placeholder.jpg";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub cms: CmsSettings,
    pub cache: CacheSettings,
    pub feed: FeedSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone)]
pub struct CmsSettings {
    /// WordPress site root; the REST API lives under `wp-json/`.
    pub base_url: Url,
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub post_list_ttl: Duration,
    pub post_ttl: Duration,
    pub taxonomy_ttl: Duration,
    pub stale_after: Duration,
    pub max_entries: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub default_page_size: u32,
    pub fallback_image_url: String,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    cms: RawCmsSettings,
    cache: RawCacheSettings,
    feed: RawFeedSettings,
    logging: RawLoggingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(url) = overrides.cms_base_url.as_ref() {
            self.cms.base_url = Some(url.clone());
        }
        if let Some(seconds) = overrides.cms_request_timeout_seconds {
            self.cms.request_timeout_seconds = Some(seconds);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            cms,
            cache,
            feed,
            logging,
        } = raw;

        let cms = build_cms_settings(cms)?;
        let cache = build_cache_settings(cache)?;
        let feed = build_feed_settings(feed)?;
        let logging = build_logging_settings(logging)?;

        Ok(Self {
            cms,
            cache,
            feed,
            logging,
        })
    }
}

fn build_cms_settings(cms: RawCmsSettings) -> Result<CmsSettings, LoadError> {
    let raw_url = cms
        .base_url
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| LoadError::invalid("cms.base_url", "is required"))?;

    let base_url = Url::parse(&raw_url)
        .map_err(|err| LoadError::invalid("cms.base_url", format!("failed to parse: {err}")))?;
    if !matches!(base_url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "cms.base_url",
            format!("unsupported scheme `{}`", base_url.scheme()),
        ));
    }

    let request_timeout = match cms.request_timeout_seconds {
        Some(0) => {
            return Err(LoadError::invalid(
                "cms.request_timeout_seconds",
                "must be greater than zero",
            ));
        }
        Some(seconds) => Some(Duration::from_secs(seconds)),
        None => None,
    };

    Ok(CmsSettings {
        base_url,
        request_timeout,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let post_list_ttl = positive_secs(
        cache.post_list_ttl_seconds,
        DEFAULT_POST_LIST_TTL_SECS,
        "cache.post_list_ttl_seconds",
    )?;
    let post_ttl = positive_secs(
        cache.post_ttl_seconds,
        DEFAULT_POST_TTL_SECS,
        "cache.post_ttl_seconds",
    )?;
    let taxonomy_ttl = positive_secs(
        cache.taxonomy_ttl_seconds,
        DEFAULT_TAXONOMY_TTL_SECS,
        "cache.taxonomy_ttl_seconds",
    )?;
    let stale_after = positive_secs(
        cache.stale_after_seconds,
        DEFAULT_STALE_AFTER_SECS,
        "cache.stale_after_seconds",
    )?;

    let max_entries = NonZeroUsize::new(cache.max_entries.unwrap_or(DEFAULT_MAX_ENTRIES))
        .ok_or_else(|| LoadError::invalid("cache.max_entries", "must be greater than zero"))?;

    Ok(CacheSettings {
        post_list_ttl,
        post_ttl,
        taxonomy_ttl,
        stale_after,
        max_entries,
    })
}

fn build_feed_settings(feed: RawFeedSettings) -> Result<FeedSettings, LoadError> {
    let default_page_size = feed.default_page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&default_page_size) {
        return Err(LoadError::invalid(
            "feed.default_page_size",
            format!("must be between 1 and {MAX_PAGE_SIZE}"),
        ));
    }

    let fallback_image_url = feed
        .fallback_image_url
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_FALLBACK_IMAGE_URL.to_string());

    Ok(FeedSettings {
        default_page_size,
        fallback_image_url,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCmsSettings {
    base_url: Option<String>,
    request_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    post_list_ttl_seconds: Option<u64>,
    post_ttl_seconds: Option<u64>,
    taxonomy_ttl_seconds: Option<u64>,
    stale_after_seconds: Option<u64>,
    max_entries: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawFeedSettings {
    default_page_size: Option<u32>,
    fallback_image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

fn positive_secs(value: Option<u64>, default: u64, key: &'static str) -> Result<Duration, LoadError> {
    match value.unwrap_or(default) {
        0 => Err(LoadError::invalid(key, "must be greater than zero")),
        seconds => Ok(Duration::from_secs(seconds)),
    }
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
