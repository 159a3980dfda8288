//! End-to-end behaviour of the content layer against a mocked WordPress API.

use std::num::NonZeroUsize;
use std::time::Duration;

use httpmock::MockServer;
use serde_json::{Value, json};
use tracing::level_filters::LevelFilter;
use url::Url;

use newsdesk::{
    FeedFilter, build_post_url,
    application::context::ContentContext,
    config::{CacheSettings, CmsSettings, FeedSettings, LogFormat, LoggingSettings, Settings},
};

fn settings(server: &MockServer) -> Settings {
    Settings {
        cms: CmsSettings {
            base_url: Url::parse(&server.base_url()).expect("mock base url"),
            request_timeout: Some(Duration::from_secs(5)),
        },
        cache: CacheSettings {
            post_list_ttl: Duration::from_secs(3600),
            post_ttl: Duration::from_secs(86_400),
            taxonomy_ttl: Duration::from_secs(604_800),
            stale_after: Duration::from_secs(300),
            max_entries: NonZeroUsize::new(100).expect("non-zero"),
        },
        feed: FeedSettings {
            default_page_size: 10,
            fallback_image_url: "/images/placeholder.jpg".to_string(),
        },
        logging: LoggingSettings {
            level: LevelFilter::WARN,
            format: LogFormat::Compact,
        },
    }
}

fn context(server: &MockServer) -> ContentContext {
    ContentContext::build(&settings(server)).expect("content context")
}

fn wire_post(id: u64, slug: &str, link: Option<&str>) -> Value {
    json!({
        "id": id,
        "slug": slug,
        "link": link,
        "date": "2024-11-05T10:00:00",
        "title": {"rendered": format!("Post {id}")},
        "excerpt": {"rendered": "<p>Resumen</p>"},
        "content": {"rendered": "<p>Cuerpo</p>"},
        "categories": [42],
        "_embedded": {
            "author": [{"id": 1, "name": "Redacción"}],
            "wp:term": [[{"id": 42, "name": "Engañadores", "slug": "enganadores", "taxonomy": "category"}]]
        }
    })
}

#[tokio::test]
async fn category_feed_resolves_normalizes_and_caches() {
    let server = MockServer::start_async().await;
    let categories = server
        .mock_async(|when, then| {
            when.method("GET")
                .path("/wp-json/wp/v2/categories")
                .query_param("slug", "enganadores");
            then.status(200).json_body(json!([
                {"id": 42, "slug": "enganadores", "name": "Engañadores", "count": 3}
            ]));
        })
        .await;
    let posts = server
        .mock_async(|when, then| {
            when.method("GET")
                .path("/wp-json/wp/v2/posts")
                .query_param_exists("_embed")
                .query_param("categories", "42")
                .query_param("per_page", "10")
                .query_param("page", "1");
            then.status(200).json_body(json!([
                wire_post(1, "primer-engano", None),
                wire_post(2, "", Some("https://cms.test/2024/11/enganadores/Segundo_Engano/")),
                wire_post(3, "", None),
            ]));
        })
        .await;

    let context = context(&server);
    let feed = context.query.posts_by_category_slug("enganadores", 10).await;

    assert_eq!(feed.len(), 3);
    for post in feed.iter() {
        assert_eq!(post.categories_names, vec!["Engañadores".to_string()]);
        assert_eq!(post.featured_image, "/images/placeholder.jpg");
        assert_eq!(post.author_name.as_deref(), Some("Redacción"));
        assert!(build_post_url(post).starts_with('/'));
    }
    let urls: Vec<String> = feed.iter().map(build_post_url).collect();
    assert_eq!(urls, vec!["/primer-engano", "/segundo-engano", "/post/3"]);

    let again = context.query.posts_by_category_slug("enganadores", 10).await;
    assert_eq!(again.len(), 3);

    categories.assert_async().await;
    posts.assert_async().await;
    assert!(context.notices.is_empty());
}

#[tokio::test]
async fn infinite_feed_ends_on_page_overflow() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET")
                .path("/wp-json/wp/v2/posts")
                .query_param("page", "1");
            then.status(200).json_body(json!([
                wire_post(1, "uno", None),
                wire_post(2, "dos", None),
            ]));
        })
        .await;
    let overflow = server
        .mock_async(|when, then| {
            when.method("GET")
                .path("/wp-json/wp/v2/posts")
                .query_param("page", "2");
            then.status(400)
                .json_body(json!({"code": "rest_post_invalid_page_number"}));
        })
        .await;

    let context = context(&server);
    let mut feed = context.query.infinite(FeedFilter::All, 2);

    assert_eq!(feed.load_pages(5).await, 2);
    assert!(!feed.has_more());
    assert_eq!(feed.items().len(), 2);
    assert!(feed.pages()[1].is_empty());

    overflow.assert_async().await;
    assert!(context.notices.is_empty());
}

#[tokio::test]
async fn unknown_category_never_lists_posts() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/wp-json/wp/v2/categories");
            then.status(200).json_body(json!([]));
        })
        .await;

    // No posts mock: a posts request would answer 404 and raise a notice.
    let context = context(&server);
    assert!(context.query.posts_by_category_slug("nada", 10).await.is_empty());
    assert_eq!(context.query.category_id("nada").await, None);

    assert!(context.notices.is_empty());
}

#[tokio::test]
async fn server_errors_raise_a_notice_and_are_retried() {
    let server = MockServer::start_async().await;
    let mut failing = server
        .mock_async(|when, then| {
            when.method("GET").path("/wp-json/wp/v2/posts");
            then.status(503).body("upstream unavailable");
        })
        .await;

    let context = context(&server);
    assert!(context.query.latest_posts(10).await.is_empty());

    let notices = context.notices.drain();
    assert_eq!(notices.len(), 1);

    failing.delete_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/wp-json/wp/v2/posts");
            then.status(200).json_body(json!([wire_post(7, "siete", None)]));
        })
        .await;

    let recovered = context.query.latest_posts(10).await;
    assert_eq!(recovered.len(), 1);
    assert_eq!(recovered[0].id, 7);
    assert!(context.notices.is_empty());
}

#[tokio::test]
async fn single_post_lookup_by_slug() {
    let server = MockServer::start_async().await;
    let lookup = server
        .mock_async(|when, then| {
            when.method("GET")
                .path("/wp-json/wp/v2/posts")
                .query_param("slug", "hola-mundo")
                .query_param("per_page", "1");
            then.status(200)
                .json_body(json!([wire_post(11, "hola-mundo", None)]));
        })
        .await;

    let context = context(&server);
    let post = context
        .query
        .post_by_slug("hola-mundo")
        .await
        .expect("post exists");
    assert_eq!(post.id, 11);
    assert_eq!(build_post_url(&post), "/hola-mundo");

    assert!(context.query.post_by_slug("hola-mundo").await.is_some());
    lookup.assert_async().await;
}

#[tokio::test]
async fn accented_and_broken_records_still_map_to_paths() {
    let server = MockServer::start_async().await;
    let mut broken = wire_post(21, "", Some("https://cms.test/2024/11/politica/enga%C3%B1o-electoral/"));
    broken["title"] = Value::Null;
    broken["_embedded"]["wp:term"] = json!({"unexpected": true});
    server
        .mock_async(|when, then| {
            when.method("GET").path("/wp-json/wp/v2/posts");
            then.status(200).json_body(json!([
                wire_post(20, "enga%c3%b1o-electoral", None),
                broken,
            ]));
        })
        .await;

    let context = context(&server);
    let feed = context.query.latest_posts(10).await;

    assert_eq!(feed.len(), 2);
    assert_eq!(build_post_url(&feed[0]), "/enga%c3%b1o-electoral");
    assert_eq!(build_post_url(&feed[1]), build_post_url(&feed[0]));
    assert!(feed[1].title.rendered.is_empty());
    assert!(feed[1].categories_names.is_empty());
    assert_eq!(feed[1].author_name.as_deref(), Some("Redacción"));
    assert!(context.notices.is_empty());
}
