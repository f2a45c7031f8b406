use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderValue, Method, Request, StatusCode, Uri},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

const TARGET: &str = "folio::http::response";
const REQUEST_ID_HEADER: &str = "x-request-id";
const DATASTAR_REQUEST_HEADER: &str = "datastar-request";

/// Per-request facts shared with the response logger.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    /// Whether the request came from the datastar runtime (an SSE interaction).
    pub datastar: bool,
}

pub async fn set_request_context(mut request: Request<Body>, next: Next) -> Response {
    let ctx = RequestContext {
        request_id: Uuid::new_v4().to_string(),
        datastar: request.headers().contains_key(DATASTAR_REQUEST_HEADER),
    };
    request.extensions_mut().insert(ctx.clone());

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&ctx.request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Log every 4xx/5xx with the diagnostic chain attached by the handler.
pub async fn log_responses(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let ctx = request.extensions().get::<RequestContext>().cloned();
    let start = Instant::now();

    let mut response = next.run(request).await;
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let report = response.extensions_mut().remove::<ErrorReport>();
        log_failure(
            Failure {
                status,
                method: &method,
                uri: &uri,
                elapsed_ms: start.elapsed().as_millis(),
                ctx: ctx.as_ref(),
            },
            report,
        );
    }

    response
}

struct Failure<'a> {
    status: StatusCode,
    method: &'a Method,
    uri: &'a Uri,
    elapsed_ms: u128,
    ctx: Option<&'a RequestContext>,
}

fn log_failure(failure: Failure<'_>, report: Option<ErrorReport>) {
    let (source, messages) = match report {
        Some(report) => (report.source, report.messages),
        None => ("unknown", Vec::new()),
    };
    let detail = messages
        .first()
        .map(String::as_str)
        .unwrap_or("no diagnostic available");
    let request_id = failure.ctx.map(|ctx| ctx.request_id.as_str()).unwrap_or("");
    let datastar = failure.ctx.is_some_and(|ctx| ctx.datastar);

    macro_rules! emit {
        ($level:ident, $message:literal) => {
            $level!(
                target = TARGET,
                status = failure.status.as_u16(),
                method = %failure.method,
                path = %failure.uri.path(),
                query = failure.uri.query().unwrap_or(""),
                elapsed_ms = failure.elapsed_ms,
                datastar,
                source,
                detail,
                chain = ?messages,
                request_id,
                $message
            )
        };
    }

    if failure.status.is_server_error() {
        emit!(error, "request failed");
    } else {
        emit!(warn, "client request error");
    }
}
