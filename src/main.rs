use std::{io::Write, process};

use newsdesk::{
    FeedFilter, Post, build_post_url,
    application::{context::ContentContext, error::AppError, notice::Notice},
    config::{self, Command, ListArgs},
    infra::telemetry,
};
use serde::Serialize;
use tracing::{Dispatch, Level, dispatcher, error};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

#[derive(Serialize)]
struct PostOutput<'a> {
    url: String,
    #[serde(flatten)]
    post: &'a Post,
}

impl<'a> PostOutput<'a> {
    fn new(post: &'a Post) -> Self {
        Self {
            url: build_post_url(post),
            post,
        }
    }
}

#[derive(Serialize)]
struct ListOutput<'a> {
    pages: usize,
    has_more: bool,
    posts: Vec<PostOutput<'a>>,
    notices: Vec<String>,
}

#[derive(Serialize)]
struct PostLookupOutput<'a> {
    post: Option<PostOutput<'a>>,
    notices: Vec<String>,
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
    slug: &'a str,
    category_id: Option<u64>,
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;
    telemetry::init(&settings.logging)?;

    let context = ContentContext::build(&settings)?;

    match cli_args.command {
        Command::Latest(list) => run_list(&context, FeedFilter::All, &list).await,
        Command::Category(args) => {
            run_list(&context, FeedFilter::Category(args.slug), &args.list).await
        }
        Command::Search(args) => {
            if args.text.trim().is_empty() {
                return Err(AppError::validation("search text must not be empty"));
            }
            run_list(&context, FeedFilter::Search(args.text), &args.list).await
        }
        Command::Post(args) => run_post(&context, &args.slug).await,
        Command::Resolve(args) => {
            let category_id = context.query.category_id(&args.slug).await;
            print_json(&ResolveOutput {
                slug: &args.slug,
                category_id,
            })
        }
    }
}

async fn run_list(
    context: &ContentContext,
    filter: FeedFilter,
    list: &ListArgs,
) -> Result<(), AppError> {
    let page_size = list.page_size.unwrap_or(context.default_page_size);
    if page_size == 0 {
        return Err(AppError::validation("--page-size must be greater than zero"));
    }

    let (posts, pages, has_more) = if list.pages <= 1 {
        let posts = context.query.posts(&filter, page_size).await.to_vec();
        let has_more = posts.len() >= page_size as usize;
        (posts, 1, has_more)
    } else {
        let mut feed = context.query.infinite(filter, page_size);
        let pages = feed.load_pages(list.pages).await;
        (feed.items(), pages, feed.has_more())
    };

    print_json(&ListOutput {
        pages,
        has_more,
        posts: posts.iter().map(PostOutput::new).collect(),
        notices: notice_messages(context.notices.drain()),
    })
}

async fn run_post(context: &ContentContext, slug: &str) -> Result<(), AppError> {
    let post = context.query.post_by_slug(slug).await;
    print_json(&PostLookupOutput {
        post: post.as_ref().map(PostOutput::new),
        notices: notice_messages(context.notices.drain()),
    })
}

fn notice_messages(notices: Vec<Notice>) -> Vec<String> {
    notices.into_iter().map(|notice| notice.message).collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).map_err(AppError::output)?;
    writeln!(stdout).map_err(AppError::output)
}
