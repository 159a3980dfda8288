use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the newsdesk binary.
#[derive(Debug, Parser)]
#[command(
    name = "newsdesk",
    version,
    about = "Read a WordPress news site through the cached content layer"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "NEWSDESK_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: SettingsOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Latest posts across every category.
    Latest(ListArgs),
    /// Posts of one category, addressed by slug.
    Category(CategoryArgs),
    /// A single post by slug.
    Post(SlugArgs),
    /// Resolve a category slug to its CMS identifier.
    Resolve(SlugArgs),
    /// Full-text search over posts.
    Search(SearchArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ListArgs {
    /// Posts per page; defaults to `feed.default_page_size`.
    #[arg(long = "page-size", value_name = "COUNT")]
    pub page_size: Option<u32>,

    /// Pages to load through the infinite feed; 1 uses the single-page feed.
    #[arg(long, value_name = "COUNT", default_value_t = 1)]
    pub pages: usize,
}

#[derive(Debug, Args, Clone)]
pub struct CategoryArgs {
    /// Category slug, with or without accents.
    pub slug: String,

    #[command(flatten)]
    pub list: ListArgs,
}

#[derive(Debug, Args, Clone)]
pub struct SlugArgs {
    pub slug: String,
}

#[derive(Debug, Args, Clone)]
pub struct SearchArgs {
    pub text: String,

    #[command(flatten)]
    pub list: ListArgs,
}

#[derive(Debug, Args, Default, Clone)]
pub struct SettingsOverrides {
    /// Override the WordPress site root.
    #[arg(long = "cms-base-url", value_name = "URL", global = true)]
    pub cms_base_url: Option<String>,

    /// Override the CMS request timeout.
    #[arg(long = "cms-request-timeout-seconds", value_name = "SECONDS", global = true)]
    pub cms_request_timeout_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}
