use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{Path, RawQuery, State},
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    application::{
        chrome::ChromeService,
        content::ContentStore,
        controller::{ListingController, ListingOptions},
        error::{ErrorReport, HttpError, load_error_status, post_page_status},
        listing::{AddressQuery, LISTING_PATH},
        portfolio::{CONTACT_PATH, portfolio_view},
        post_page::{PostPage, PostPageError},
    },
    cache::PageViews,
    config::PortfolioSettings,
    infra::assets::StaticAssets,
    presentation::{
        mounts::{MountSet, PageDocument},
        partials::{
            asset_url, listing_retry_action, post_retry_action, restore_action, search_action,
        },
        render::{render_listing, render_load_error, render_not_found, render_post},
        views::{
            BlogPageView, BlogTemplate, LayoutChrome, LayoutContext, PortfolioTemplate,
            PostPageView, PostTemplate, render_not_found_response, render_template_response,
        },
    },
};

use super::{
    contact::contact_submit,
    interactions::{listing_interaction, listing_retry, post_retry},
    middleware::{log_responses, set_request_context},
};

const SOURCE: &str = "folio::infra::http::public";

#[derive(Clone)]
pub struct HttpState {
    pub store: ContentStore,
    pub views: Arc<PageViews>,
    pub chrome: Arc<ChromeService>,
    pub options: ListingOptions,
    pub portfolio: Arc<PortfolioSettings>,
    pub assets: Arc<StaticAssets>,
}

pub fn build_router(state: HttpState) -> Router {
    let pages = Router::new()
        .route("/", get(portfolio))
        .route("/index.html", get(portfolio))
        .route("/blog", get(blog_listing))
        .route("/blog.html", get(blog_listing))
        .route("/blogs", get(post_missing))
        .route("/blogs/", get(post_missing))
        .route("/blogs/{file}", get(post_detail));

    let streams = Router::new()
        .route("/ui/blog", get(listing_interaction))
        .route("/ui/blog/retry", get(listing_retry))
        .route("/ui/blogs/{file}", get(post_retry))
        .route(CONTACT_PATH, post(contact_submit));

    pages
        .merge(streams)
        .route("/_health", get(health))
        .fallback(fallback_router)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn portfolio(State(state): State<HttpState>) -> Response {
    let chrome = state.chrome.load();
    let content = portfolio_view(&state.portfolio, state.chrome.site_title());
    let view = LayoutContext::new(chrome, content);
    render_template_response(PortfolioTemplate { view }, StatusCode::OK)
}

async fn blog_listing(State(state): State<HttpState>, RawQuery(query): RawQuery) -> Response {
    let chrome = state.chrome.load().with_title("Blog");
    let address = AddressQuery::parse(query.as_deref().unwrap_or_default());
    let mut document = PageDocument::new(MountSet::listing());

    let catalog = match state.store.load().await {
        Ok(catalog) => catalog,
        Err(err) => {
            let status = load_error_status(&err);
            if let Err(render) = render_load_error(
                &mut document,
                err.public_message(),
                listing_retry_action(&address),
            ) {
                return HttpError::from(render).into_response();
            }
            let view = LayoutContext::new(chrome, blog_page(document)).with_view("");
            let mut response = render_template_response(BlogTemplate { view }, status);
            ErrorReport::from_error(SOURCE, status, &err).attach(&mut response);
            return response;
        }
    };

    let mut controller = ListingController::new(catalog, state.options);
    controller.restore(&address);
    if let Err(err) = render_listing(&mut document, &controller.view()) {
        return HttpError::from(err).into_response();
    }

    let view_id = state.views.open(controller);
    let view = LayoutContext::new(chrome, blog_page(document)).with_view(view_id);
    render_template_response(BlogTemplate { view }, StatusCode::OK)
}

fn blog_page(document: PageDocument) -> BlogPageView {
    BlogPageView {
        document,
        search_action: search_action(),
        restore_action: restore_action(),
    }
}

async fn post_detail(State(state): State<HttpState>, Path(file): Path<String>) -> Response {
    let chrome = state.chrome.load();
    let mut document = PageDocument::new(MountSet::post());

    let catalog = match state.store.load().await {
        Ok(catalog) => catalog,
        Err(err) => {
            let status = load_error_status(&err);
            if let Err(render) =
                render_load_error(&mut document, err.public_message(), post_retry_action(&file))
            {
                return HttpError::from(render).into_response();
            }
            let mut response = post_response(chrome, document, None, status);
            ErrorReport::from_error(SOURCE, status, &err).attach(&mut response);
            return response;
        }
    };

    match PostPage::resolve(&catalog, &file, state.options.related_limit) {
        Ok(page) => {
            if let Err(err) = render_post(&mut document, &page, &state.options.reading) {
                return HttpError::from(err).into_response();
            }
            let post = page.post;
            let chrome = chrome
                .with_title(&post.title)
                .with_description(&post.excerpt);
            let cover = post.cover_image.as_deref().map(asset_url);
            post_response(chrome, document, cover, StatusCode::OK)
        }
        Err(err) => not_found_post(chrome, document, err),
    }
}

async fn post_missing(State(state): State<HttpState>) -> Response {
    let document = PageDocument::new(MountSet::post());
    not_found_post(state.chrome.load(), document, PostPageError::MissingSlug)
}

fn not_found_post(
    chrome: LayoutChrome,
    mut document: PageDocument,
    error: PostPageError,
) -> Response {
    let status = post_page_status(&error);
    if let Err(render) = render_not_found(&mut document, error.public_message()) {
        return HttpError::from(render).into_response();
    }
    let chrome = chrome.with_title("Post Not Found");
    let mut response = post_response(chrome, document, None, status);
    ErrorReport::from_error(SOURCE, status, &error).attach(&mut response);
    response
}

fn post_response(
    chrome: LayoutChrome,
    document: PageDocument,
    cover_image: Option<String>,
    status: StatusCode,
) -> Response {
    let content = PostPageView {
        document,
        cover_image,
        listing_href: LISTING_PATH.to_string(),
    };
    let view = LayoutContext::new(chrome, content);
    render_template_response(PostTemplate { view }, status)
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn fallback_router(State(state): State<HttpState>, request: Request<Body>) -> Response {
    if let Some(response) = state.assets.serve(request.uri().path()).await {
        return response;
    }
    render_not_found_response(state.chrome.load())
}
