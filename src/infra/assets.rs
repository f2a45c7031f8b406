//! Static files (images, videos, stylesheets) served from a site directory.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use mime_guess::Mime;
use tracing::error;

use crate::application::error::ErrorReport;

const SOURCE: &str = "folio::infra::assets";

/// Directory whose files are served under the site root, e.g.
/// `public/images/goa.jpg` as `/images/goa.jpg`.
#[derive(Debug, Clone)]
pub struct StaticAssets {
    root: PathBuf,
}

pub struct Asset {
    contents: Bytes,
    mime: Mime,
}

impl StaticAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the file addressed by a request path. `Ok(None)` covers missing
    /// files as well as paths that are not allowed.
    pub async fn resolve(&self, request_path: &str) -> Result<Option<Asset>, StatusCode> {
        let Some(relative) = sanitize(request_path) else {
            return Ok(None);
        };

        let path = self.root.join(&relative);
        match tokio::fs::read(&path).await {
            Ok(contents) => Ok(Some(Asset {
                contents: Bytes::from(contents),
                mime: mime_guess::from_path(&path).first_or_octet_stream(),
            })),
            Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
                Ok(None)
            }
            Err(err) => {
                error!(
                    target = SOURCE,
                    path = %path.display(),
                    error = %err,
                    "failed to read static asset"
                );
                Err(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// Serve `request_path`, or `None` when there is no such asset.
    pub async fn serve(&self, request_path: &str) -> Option<Response> {
        match self.resolve(request_path).await {
            Ok(Some(asset)) => Some(asset.into_response()),
            Ok(None) => None,
            Err(status) => Some(rejected_response(status)),
        }
    }
}

fn sanitize(request_path: &str) -> Option<PathBuf> {
    let candidate = request_path.trim_start_matches('/');
    if candidate.is_empty() || candidate.ends_with('/') {
        return None;
    }

    let mut relative = PathBuf::new();
    for segment in candidate.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
            return None;
        }
        relative.push(segment);
    }
    Some(relative)
}

fn rejected_response(status: StatusCode) -> Response {
    let mut response = status.into_response();
    ErrorReport::from_message(SOURCE, status, "Static asset request rejected")
        .attach(&mut response);
    response
}

impl IntoResponse for Asset {
    fn into_response(self) -> Response {
        let len = self.contents.len();
        let mut response = Response::new(Body::from(self.contents));
        *response.status_mut() = StatusCode::OK;

        let headers = response.headers_mut();
        if let Ok(value) = HeaderValue::from_str(self.mime.as_ref()) {
            headers.insert(header::CONTENT_TYPE, value);
        }
        if let Ok(value) = HeaderValue::from_str(&len.to_string()) {
            headers.insert(header::CONTENT_LENGTH, value);
        }
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=3600"),
        );

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_and_directories_are_refused() {
        assert!(sanitize("/../secret").is_none());
        assert!(sanitize("/images/../../etc/passwd").is_none());
        assert!(sanitize("/images/").is_none());
        assert!(sanitize("/").is_none());
        assert_eq!(
            sanitize("/images/goa.jpg"),
            Some(PathBuf::from("images").join("goa.jpg"))
        );
    }

    #[tokio::test]
    async fn serves_files_with_guessed_type() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("css")).expect("mkdir");
        std::fs::write(dir.path().join("css/site.css"), "body{}").expect("write");

        let assets = StaticAssets::new(dir.path());
        let response = assets.serve("/css/site.css").await.expect("asset");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some("text/css".as_bytes())
        );
        assert!(assets.serve("/css/missing.css").await.is_none());
        assert!(assets.serve("/css").await.is_none());
    }
}
