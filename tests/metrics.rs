use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use folio::application::content::{ContentSource, ContentStore, LoadError};
use folio::application::controller::{ListingController, ListingOptions};
use folio::cache::PageViews;
use folio::domain::posts::Catalog;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

/// Replays one canned outcome per load.
enum Outcome {
    Body(&'static str),
    Status(u16),
    Unreachable,
}

struct ScriptedSource(Outcome);

#[async_trait]
impl ContentSource for ScriptedSource {
    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        match &self.0 {
            Outcome::Body(body) => Ok(body.as_bytes().to_vec()),
            Outcome::Status(status) => Err(LoadError::Status { status: *status }),
            Outcome::Unreachable => Err(LoadError::unreachable("connection refused")),
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

fn store(outcome: Outcome) -> ContentStore {
    ContentStore::new(Arc::new(ScriptedSource(outcome)))
}

fn controller() -> ListingController {
    ListingController::new(Arc::new(Catalog::default()), ListingOptions::default())
}

// One test per binary: the debugging recorder is process-global.
#[tokio::test]
async fn loads_and_page_views_emit_expected_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    store(Outcome::Body(r#"{"posts": []}"#))
        .load()
        .await
        .expect("empty document loads");
    store(Outcome::Body(r#"{"posts": "#))
        .load()
        .await
        .expect_err("truncated document");
    store(Outcome::Status(503)).load().await.expect_err("status");
    store(Outcome::Status(404)).load().await.expect_err("status");
    store(Outcome::Unreachable).load().await.expect_err("unreachable");

    let views = PageViews::new(NonZeroUsize::new(2).expect("non-zero"));
    for _ in 0..5 {
        views.open(controller());
    }

    let mut loads = 0;
    let mut failures = Vec::new();
    let mut evicted = 0;
    let mut open = None;
    for (key, _, _, value) in snapshotter.snapshot().into_vec() {
        let key = key.key();
        match (key.name(), value) {
            ("folio_content_load_total", DebugValue::Counter(count)) => loads = count,
            ("folio_content_load_failed_total", DebugValue::Counter(count)) => {
                let kind = key
                    .labels()
                    .find(|label| label.key() == "kind")
                    .map(|label| label.value().to_string())
                    .expect("failures are labelled by kind");
                failures.push((kind, count));
            }
            ("folio_page_views_evicted_total", DebugValue::Counter(count)) => evicted = count,
            ("folio_page_views_open", DebugValue::Gauge(level)) => open = Some(level.into_inner()),
            _ => {}
        }
    }
    failures.sort();

    assert_eq!(loads, 5);
    assert_eq!(
        failures,
        [
            ("parse".to_string(), 1),
            ("status".to_string(), 2),
            ("unreachable".to_string(), 1),
        ]
    );
    assert_eq!(evicted, 3);
    assert_eq!(open, Some(2.0));
}
