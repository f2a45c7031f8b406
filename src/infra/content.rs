//! Content sources backed by HTTP and the local filesystem.

use std::{path::PathBuf, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::{
    application::content::{ContentSource, LoadError},
    config::{ContentLocation, ContentSettings},
};

use super::error::InfraError;

const SOURCE: &str = "folio::infra::content";

/// Fetches the blog data document with a single GET request.
pub struct HttpContentSource {
    client: Client,
    url: Url,
}

impl HttpContentSource {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        debug!(target = SOURCE, url = %self.url, "fetching blog data");

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|err| LoadError::unreachable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| LoadError::unreachable(err.to_string()))?;
        Ok(body.to_vec())
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// Reads the blog data document from disk on every load.
pub struct FileContentSource {
    path: PathBuf,
}

impl FileContentSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ContentSource for FileContentSource {
    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        debug!(target = SOURCE, path = %self.path.display(), "reading blog data");

        tokio::fs::read(&self.path).await.map_err(|err| {
            LoadError::unreachable(format!("failed to read {}: {err}", self.path.display()))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Build the content source named by the settings.
pub fn source_from_settings(
    settings: &ContentSettings,
) -> Result<Arc<dyn ContentSource>, InfraError> {
    let source: Arc<dyn ContentSource> = match &settings.location {
        ContentLocation::Url(url) => Arc::new(HttpContentSource::new(url.clone(), settings.timeout)?),
        ContentLocation::Path(path) => Arc::new(FileContentSource::new(path.clone())),
    };
    Ok(source)
}
