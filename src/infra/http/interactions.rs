//! Datastar endpoints. Each answers with an SSE stream of fragment patches
//! for the page that issued the request.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    application::{
        content::LoadError,
        controller::{HistoryChange, Interaction, ListingController, ListingUpdate},
        error::HttpError,
        listing::AddressQuery,
        post_page::PostPage,
        stream::PatchStream,
    },
    cache::ViewId,
    presentation::{
        mounts::{Mount, MountSet},
        partials::{asset_url, listing_retry_action, post_retry_action},
        render::{render_listing, render_load_error, render_not_found, render_post},
    },
};

use super::HttpState;

const SOURCE: &str = "folio::infra::http::interactions";
const POST_HEADER_SELECTOR: &str = ".blog-post-header";
const POST_HEADER_PROPERTY: &str = "--header-bg";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct InteractionQuery {
    view: Option<String>,
    action: Option<String>,
    value: Option<String>,
    category: Option<String>,
    tag: Option<String>,
}

/// What the client asked the listing view to do.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ListingRequest {
    Apply(Interaction),
    /// Back/forward navigation: re-read the address bar.
    Restore(AddressQuery),
}

impl ListingRequest {
    fn run(self, controller: &mut ListingController) -> ListingUpdate {
        match self {
            ListingRequest::Apply(interaction) => controller.apply(interaction),
            ListingRequest::Restore(address) => {
                controller.restore(&address);
                ListingUpdate {
                    history: HistoryChange::Keep,
                    scroll_to_results: false,
                }
            }
        }
    }

    /// Address to retry with when the request could not be served.
    fn retry_address(&self, current: AddressQuery) -> AddressQuery {
        match self {
            ListingRequest::Apply(Interaction::SelectCategory(name)) => AddressQuery {
                category: Some(name.clone()),
                tag: None,
            },
            ListingRequest::Apply(Interaction::SelectTag(tag)) => AddressQuery {
                category: None,
                tag: Some(tag.clone()),
            },
            ListingRequest::Apply(Interaction::Search(_) | Interaction::ClearFilter) => {
                AddressQuery::default()
            }
            ListingRequest::Apply(Interaction::GoToPage(_)) | ListingRequest::Restore(_) => current,
        }
    }
}

impl InteractionQuery {
    fn request(&self) -> Result<ListingRequest, HttpError> {
        let value = self.value.as_deref().unwrap_or_default();
        let action = self.action.as_deref().unwrap_or_default().trim();

        let interaction = match action {
            "category" => Interaction::SelectCategory(required(action, value)?),
            "tag" => Interaction::SelectTag(required(action, value)?),
            "search" => Interaction::Search(value.to_string()),
            "clear" => Interaction::ClearFilter,
            "page" => match value.trim().parse::<usize>() {
                Ok(page) if page >= 1 => Interaction::GoToPage(page),
                _ => {
                    return Err(HttpError::new(
                        SOURCE,
                        StatusCode::BAD_REQUEST,
                        "Invalid page number",
                        format!("page `{value}` is not a positive number"),
                    ));
                }
            },
            "restore" => return Ok(ListingRequest::Restore(self.address())),
            other => {
                return Err(HttpError::new(
                    SOURCE,
                    StatusCode::BAD_REQUEST,
                    "Unknown listing action",
                    format!("unknown listing action `{other}`"),
                ));
            }
        };

        Ok(ListingRequest::Apply(interaction))
    }

    /// Filter carried by the page's address bar when the request was sent.
    fn address(&self) -> AddressQuery {
        AddressQuery {
            category: self.category.clone(),
            tag: self.tag.clone(),
        }
    }

    fn view_id(&self) -> Option<ViewId> {
        self.view.as_deref().and_then(|raw| raw.parse().ok())
    }
}

fn required(action: &str, value: &str) -> Result<String, HttpError> {
    if value.trim().is_empty() {
        return Err(HttpError::new(
            SOURCE,
            StatusCode::BAD_REQUEST,
            "Missing filter value",
            format!("listing action `{action}` needs a value"),
        ));
    }
    Ok(value.to_string())
}

pub(super) async fn listing_interaction(
    State(state): State<HttpState>,
    Query(query): Query<InteractionQuery>,
) -> Response {
    let request = match query.request() {
        Ok(request) => request,
        Err(err) => return err.into_response(),
    };
    let mut stream = PatchStream::new(MountSet::listing());

    let existing = query.view_id().and_then(|id| {
        let request = request.clone();
        state.views.update(id, move |controller| request.run(controller))
    });

    let (update, controller) = match existing {
        Some(found) => found,
        None => {
            debug!(
                target = SOURCE,
                view = query.view.as_deref().unwrap_or(""),
                "unknown page view, reloading blog data"
            );
            let catalog = match state.store.load().await {
                Ok(catalog) => catalog,
                Err(err) => {
                    let address = request.retry_address(query.address());
                    return listing_failure(stream, &err, &address);
                }
            };
            let mut controller = ListingController::new(catalog, state.options);
            controller.restore(&query.address());
            let update = request.run(&mut controller);
            let id = state.views.open(controller.clone());
            stream.push_view(id);
            (update, controller)
        }
    };

    if let Err(err) = render_listing(&mut stream, &controller.view()) {
        return HttpError::from(err).into_response();
    }
    if let HistoryChange::Push(url) = &update.history {
        stream.push_history(url);
    }
    if update.scroll_to_results {
        stream.scroll_into_view(Mount::PostsGrid);
    }
    stream.into_response()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RetryQuery {
    view: Option<String>,
    category: Option<String>,
    tag: Option<String>,
}

pub(super) async fn listing_retry(
    State(state): State<HttpState>,
    Query(query): Query<RetryQuery>,
) -> Response {
    let mut stream = PatchStream::new(MountSet::listing());
    let address = AddressQuery {
        category: query.category,
        tag: query.tag,
    };

    let catalog = match state.store.load().await {
        Ok(catalog) => catalog,
        Err(err) => return listing_failure(stream, &err, &address),
    };

    let mut controller = ListingController::new(catalog, state.options);
    controller.restore(&address);
    if let Err(err) = render_listing(&mut stream, &controller.view()) {
        return HttpError::from(err).into_response();
    }
    let reused = query
        .view
        .as_deref()
        .and_then(|raw| raw.parse::<ViewId>().ok())
        .is_some_and(|id| state.views.replace(id, controller.clone()));
    if !reused {
        stream.push_view(state.views.open(controller));
    }
    stream.into_response()
}

pub(super) async fn post_retry(
    State(state): State<HttpState>,
    Path(file): Path<String>,
) -> Response {
    let mut stream = PatchStream::new(MountSet::post());

    let catalog = match state.store.load().await {
        Ok(catalog) => catalog,
        Err(err) => {
            warn!(
                target = SOURCE,
                file = %file,
                error = %err,
                "post retry failed to load blog data"
            );
            if let Err(render) =
                render_load_error(&mut stream, err.public_message(), post_retry_action(&file))
            {
                return HttpError::from(render).into_response();
            }
            return stream.into_response();
        }
    };

    let rendered = match PostPage::resolve(&catalog, &file, state.options.related_limit) {
        Ok(page) => {
            let post = page.post;
            stream.set_document_title(&format!("{} | {}", post.title, state.chrome.site_title()));
            if let Some(cover) = post.cover_image.as_deref() {
                let value = format!("url('{}')", asset_url(cover).replace('\'', "%27"));
                stream.set_style_property(POST_HEADER_SELECTOR, POST_HEADER_PROPERTY, &value);
            }
            render_post(&mut stream, &page, &state.options.reading)
        }
        Err(err) => {
            debug!(target = SOURCE, file = %file, error = %err, "post retry found no post");
            render_not_found(&mut stream, err.public_message())
        }
    };

    match rendered {
        Ok(()) => stream.into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

fn listing_failure(mut stream: PatchStream, error: &LoadError, address: &AddressQuery) -> Response {
    warn!(
        target = SOURCE,
        error = %error,
        "listing interaction failed to load blog data"
    );
    match render_load_error(
        &mut stream,
        error.public_message(),
        listing_retry_action(address),
    ) {
        Ok(()) => stream.into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}
