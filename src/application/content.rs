//! Loading the blog data document into a catalog.

use std::sync::Arc;

use async_trait::async_trait;
use folio_types::BlogDocument;
use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::posts::Catalog;

const SOURCE: &str = "folio::application::content";
const METRIC_CONTENT_LOAD_TOTAL: &str = "folio_content_load_total";
const METRIC_CONTENT_LOAD_FAILED_TOTAL: &str = "folio_content_load_failed_total";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("content source answered with status {status}")]
    Status { status: u16 },
    #[error("content source unreachable: {message}")]
    Unreachable { message: String },
    #[error("blog data is malformed")]
    Parse(#[from] serde_json::Error),
}

impl LoadError {
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            LoadError::Status { .. } => "status",
            LoadError::Unreachable { .. } => "unreachable",
            LoadError::Parse(_) => "parse",
        }
    }

    /// Message shown in the error panel.
    pub fn public_message(&self) -> String {
        match self {
            LoadError::Status { status } => format!("Failed to load blog data: {status}"),
            LoadError::Unreachable { .. } => {
                "Failed to load blog data: the content source could not be reached".to_string()
            }
            LoadError::Parse(_) => "Failed to load blog data: the data file is malformed".to_string(),
        }
    }
}

/// Where the blog data document comes from.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the raw document bytes once.
    async fn fetch(&self) -> Result<Vec<u8>, LoadError>;

    /// Human-readable location for logs and reports.
    fn describe(&self) -> String;
}

/// Loads a fresh catalog per page view. Nothing is cached between loads.
#[derive(Clone)]
pub struct ContentStore {
    source: Arc<dyn ContentSource>,
}

impl ContentStore {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    pub async fn load(&self) -> Result<Arc<Catalog>, LoadError> {
        counter!(METRIC_CONTENT_LOAD_TOTAL).increment(1);

        match self.fetch_and_parse().await {
            Ok(catalog) => {
                info!(
                    target = SOURCE,
                    source = %self.source.describe(),
                    posts = catalog.len(),
                    categories = catalog.categories().len(),
                    "blog data loaded"
                );
                Ok(Arc::new(catalog))
            }
            Err(err) => {
                counter!(METRIC_CONTENT_LOAD_FAILED_TOTAL, "kind" => err.kind()).increment(1);
                warn!(
                    target = SOURCE,
                    source = %self.source.describe(),
                    kind = err.kind(),
                    error = %err,
                    "failed to load blog data"
                );
                Err(err)
            }
        }
    }

    async fn fetch_and_parse(&self) -> Result<Catalog, LoadError> {
        let bytes = self.source.fetch().await?;
        let document: BlogDocument = serde_json::from_slice(&bytes)?;
        Ok(Catalog::from_document(document))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::StaticSource;
    use super::*;

    #[tokio::test]
    async fn load_builds_catalog() {
        let store = ContentStore::new(StaticSource::json(
            r#"{"posts":[{"id":1,"slug":"a","title":"A"}],"categories":{"Travel":1}}"#,
        ));

        let catalog = store.load().await.expect("catalog");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.categories()[0].name, "Travel");
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let store = ContentStore::new(StaticSource::json(r#"{"posts": [ "#));
        let err = store.load().await.expect_err("parse failure");
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[tokio::test]
    async fn status_errors_surface_in_public_message() {
        let store = ContentStore::new(StaticSource::status(404));
        let err = store.load().await.expect_err("status failure");
        assert!(matches!(err, LoadError::Status { status: 404 }));
        assert_eq!(err.public_message(), "Failed to load blog data: 404");
    }
}
