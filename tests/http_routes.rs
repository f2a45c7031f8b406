use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use folio::application::chrome::ChromeService;
use folio::application::content::{ContentSource, ContentStore, LoadError};
use folio::application::controller::ListingOptions;
use folio::cache::PageViews;
use folio::config::{NavigationLink, PortfolioSettings, SiteSettings};
use folio::infra::assets::StaticAssets;
use folio::infra::http::{HttpState, build_router};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

const BLOG_DATA: &str = r#"{
  "posts": [
    {"id": 1, "slug": "monsoon-in-goa", "title": "Monsoon in Goa", "excerpt": "Rain and rivers.",
     "date": "2026-07-14", "category": "Travel", "tags": ["goa", "beach"],
     "coverImage": "images/goa.jpg", "featured": true,
     "content": [{"type": "paragraph", "text": "Most people leave when the rains arrive."}]},
    {"id": 2, "slug": "backwaters", "title": "Backwaters", "date": "2026-06-01", "category": "Travel", "tags": ["kerala"]},
    {"id": 3, "slug": "dal-tadka", "title": "Dal Tadka", "date": "2026-05-01", "category": "Food", "tags": ["recipe"]},
    {"id": 4, "slug": "chai", "title": "Cutting Chai", "date": "2026-04-01", "category": "Food", "tags": ["recipe", "tea"]},
    {"id": 5, "slug": "hampi", "title": "Boulders of Hampi", "date": "2026-03-01", "category": "Travel", "tags": ["karnataka"]},
    {"id": 6, "slug": "notebook", "title": "Notebook", "date": "2026-02-01", "category": "Notes", "tags": ["journal"]},
    {"id": 7, "slug": "trains", "title": "Night Trains", "date": "2026-01-15", "category": "Travel", "tags": ["rail"]},
    {"id": 8, "slug": "markets", "title": "Spice Markets", "date": "2026-01-01", "category": "Food", "tags": ["spice", "beach"]}
  ]
}"#;

/// Serves a fixed document, or fails every load when `body` is `None`.
struct FixtureSource {
    body: Option<&'static str>,
}

#[async_trait]
impl ContentSource for FixtureSource {
    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        match self.body {
            Some(body) => Ok(body.as_bytes().to_vec()),
            None => Err(LoadError::Status { status: 503 }),
        }
    }

    fn describe(&self) -> String {
        "fixture".to_string()
    }
}

fn site(assets_dir: PathBuf) -> SiteSettings {
    SiteSettings {
        title: "Folio".to_string(),
        description: "Notes and travels".to_string(),
        author: "Folio Author".to_string(),
        datastar_script: "/datastar.js".to_string(),
        navigation: vec![NavigationLink {
            label: "Blog".to_string(),
            href: "/blog".to_string(),
        }],
        assets_dir,
    }
}

fn app_with(body: Option<&'static str>, views: usize, assets_dir: PathBuf) -> Router {
    let state = HttpState {
        store: ContentStore::new(Arc::new(FixtureSource { body })),
        views: Arc::new(PageViews::new(
            NonZeroUsize::new(views).expect("non-zero capacity"),
        )),
        chrome: Arc::new(ChromeService::new(site(assets_dir.clone()))),
        options: ListingOptions::default(),
        portfolio: Arc::new(PortfolioSettings::default()),
        assets: Arc::new(StaticAssets::new(assets_dir)),
    };
    build_router(state)
}

fn app() -> Router {
    app_with(Some(BLOG_DATA), 16, PathBuf::from("missing-assets"))
}

async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    app.clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

async fn body_text(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// The page-view id embedded in the page's root signals.
fn view_id(html: &str) -> String {
    html.as_bytes()
        .windows(36)
        .filter_map(|window| std::str::from_utf8(window).ok())
        .find(|candidate| candidate.matches('-').count() == 4 && Uuid::parse_str(candidate).is_ok())
        .map(str::to_string)
        .expect("page should carry a view id")
}

fn is_event_stream(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("text/event-stream"))
}

#[tokio::test]
async fn listing_page_renders_every_mount_point() {
    let app = app();
    let response = get(&app, "/blog").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let html = body_text(response).await;
    assert!(html.contains("<title>Blog | Folio</title>"));
    assert!(html.contains("Monsoon in Goa"));
    assert!(html.contains("/images/goa.jpg"));
    assert!(html.contains("Backwaters"));
    assert!(html.contains("Cutting Chai"));
    // Seven unfeatured posts at six per page.
    assert!(!html.contains("Spice Markets"));
    assert!(html.contains("class=\"page-btn"));
    assert!(html.contains("Notes"));
    let _ = view_id(&html);
}

#[tokio::test]
async fn filtered_listing_hides_the_featured_post() {
    let app = app();
    let html = body_text(get(&app, "/blog?category=Food").await).await;

    assert!(html.contains("Dal Tadka"));
    assert!(html.contains("Spice Markets"));
    assert!(!html.contains("Read Full Post"));
    assert!(!html.contains("Night Trains"));
    assert!(html.contains("clear-filter"));
}

#[tokio::test]
async fn failed_load_returns_bad_gateway_with_retry_panel() {
    let app = app_with(None, 4, PathBuf::from("missing-assets"));
    let response = get(&app, "/blog?tag=beach").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let html = body_text(response).await;
    assert!(html.contains("Something went wrong"));
    assert!(html.contains("Failed to load blog data: 503"));
    assert!(html.contains("/ui/blog/retry?tag=beach"));
    assert!(!html.contains("blog-card"));
}

#[tokio::test]
async fn post_page_renders_the_resolved_post() {
    let app = app();
    let response = get(&app, "/blogs/monsoon-in-goa.html").await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("<title>Monsoon in Goa | Folio</title>"));
    assert!(html.contains("Most people leave when the rains arrive."));
    assert!(html.contains("--header-bg"));
    assert!(html.contains("/images/goa.jpg"));
    assert!(html.contains("← Backwaters"));
    assert!(html.contains("Related Posts"));
}

#[tokio::test]
async fn unknown_and_missing_slugs_are_not_found() {
    let app = app();

    let response = get(&app, "/blogs/ghost.html").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Post not found: ghost"));

    let response = get(&app, "/blogs/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("No post specified in URL"));
}

#[tokio::test]
async fn tag_interaction_streams_patches_and_pushes_history() {
    let app = app();
    let html = body_text(get(&app, "/blog").await).await;
    let view = view_id(&html);

    let response = get(&app, &format!("/ui/blog?action=tag&value=beach&view={view}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(is_event_stream(&response));

    let body = body_text(response).await;
    assert!(body.contains("datastar-patch-elements"));
    assert!(body.contains("#posts-grid"));
    assert!(body.contains("Spice Markets"));
    assert!(body.contains("window.history.pushState({}, '', \"/blog?tag=beach\");"));
    assert!(!body.contains("datastar-patch-signals"));
}

#[tokio::test]
async fn page_interaction_scrolls_without_touching_history() {
    let app = app();
    let view = view_id(&body_text(get(&app, "/blog").await).await);

    let body = body_text(get(&app, &format!("/ui/blog?action=page&value=2&view={view}")).await).await;
    assert!(body.contains("scrollIntoView"));
    assert!(!body.contains("pushState"));
    // The seventh unfeatured post is all that remains for page two.
    assert!(body.contains("Spice Markets"));
}

#[tokio::test]
async fn evicted_views_are_reloaded_into_a_fresh_view() {
    let app = app_with(Some(BLOG_DATA), 1, PathBuf::from("missing-assets"));
    let first = view_id(&body_text(get(&app, "/blog").await).await);
    let second = view_id(&body_text(get(&app, "/blog").await).await);
    assert_ne!(first, second);

    let body = body_text(get(&app, &format!("/ui/blog?action=clear&view={first}")).await).await;
    assert!(body.contains("datastar-patch-signals"));
    assert!(!body.contains(&first));
}

#[tokio::test]
async fn evicted_filtered_views_rebuild_from_the_address() {
    let app = app_with(Some(BLOG_DATA), 1, PathBuf::from("missing-assets"));
    let food = view_id(&body_text(get(&app, "/blog?category=Food").await).await);
    let _ = view_id(&body_text(get(&app, "/blog").await).await);

    let body = body_text(
        get(&app, &format!("/ui/blog?action=page&value=2&view={food}&category=Food")).await,
    )
    .await;
    assert!(body.contains("datastar-patch-signals"));
    assert!(!body.contains("Spice Markets"));
    assert!(body.contains("Category: <strong>Food</strong>"));

    let body = body_text(
        get(&app, &format!("/ui/blog?action=page&value=1&view={food}&category=Food")).await,
    )
    .await;
    assert!(body.contains("Spice Markets"));
    assert!(!body.contains("Night Trains"));
}

#[tokio::test]
async fn malformed_interactions_are_rejected() {
    let app = app();
    let response = get(&app, "/ui/blog?action=explode").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(&app, "/ui/blog?action=page&value=0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn retry_streams_the_error_panel_while_the_source_is_down() {
    let app = app_with(None, 4, PathBuf::from("missing-assets"));

    let response = get(&app, "/ui/blog/retry?category=Food").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("#error-container"));
    assert!(body.contains("Failed to load blog data: 503"));

    let body = body_text(get(&app, "/ui/blogs/monsoon-in-goa.html").await).await;
    assert!(body.contains("#error-container"));
}

#[tokio::test]
async fn post_retry_streams_the_post() {
    let app = app();
    let response = get(&app, "/ui/blogs/backwaters.html").await;
    assert!(is_event_stream(&response));

    let body = body_text(response).await;
    assert!(body.contains("#post-title"));
    assert!(body.contains("Backwaters"));
    assert!(body.contains("document.title = \"Backwaters | Folio\";"));
}

#[tokio::test]
async fn portfolio_health_and_assets() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(dir.path().join("images")).expect("mkdir");
    std::fs::write(dir.path().join("images/goa.jpg"), b"jpeg").expect("write");
    let app = app_with(Some(BLOG_DATA), 4, dir.path().to_path_buf());

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Folio Author"));

    assert_eq!(get(&app, "/_health").await.status(), StatusCode::NO_CONTENT);

    let response = get(&app, "/images/goa.jpg").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|value| value.as_bytes()),
        Some("image/jpeg".as_bytes())
    );

    assert_eq!(
        get(&app, "/images/../secret").await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(get(&app, "/nowhere").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn retry_reloads_an_open_view_in_place() {
    let app = app();
    let view = view_id(&body_text(get(&app, "/blog").await).await);

    let body = body_text(get(&app, &format!("/ui/blog/retry?tag=recipe&view={view}")).await).await;
    assert!(body.contains("Cutting Chai"));
    assert!(!body.contains("datastar-patch-signals"));

    let body = body_text(get(&app, "/ui/blog/retry?tag=recipe").await).await;
    assert!(body.contains("datastar-patch-signals"));
}

async fn post_form(app: &Router, uri: &str, body: &'static str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .expect("request should build");
    app.clone()
        .oneshot(request)
        .await
        .expect("router should respond")
}

#[tokio::test]
async fn contact_form_is_acknowledged_and_reset() {
    let app = app();
    let html = body_text(get(&app, "/").await).await;
    assert!(html.contains("id=\"contact-form\""));
    assert!(html.contains("id=\"contact-status\""));

    let response = post_form(
        &app,
        "/ui/contact",
        "name=Asha&email=asha%40example.com&message=Loved+the+Goa+post",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(is_event_stream(&response));
    let body = body_text(response).await;
    assert!(body.contains("#contact-status"));
    assert!(body.contains("Thank you for your message! I will get back to you soon."));
    assert!(body.contains("contact-form"));
    assert!(body.contains("reset()"));

    let body = body_text(post_form(&app, "/ui/contact", "name=Asha&email=nope&message=hi").await).await;
    assert!(body.contains("Please enter a valid email address."));
    assert!(!body.contains("reset()"));
}
