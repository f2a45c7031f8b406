use std::{fmt, num::NonZeroUsize, str::FromStr, sync::Mutex};

use lru::LruCache;
use metrics::{counter, gauge};
use tracing::debug;
use uuid::Uuid;

use crate::application::controller::ListingController;

use super::lock::mutex_lock;

const SOURCE: &str = "folio::cache::views";
const METRIC_PAGE_VIEWS_OPEN: &str = "folio_page_views_open";
const METRIC_PAGE_VIEWS_EVICTED_TOTAL: &str = "folio_page_views_evicted_total";

/// Identifier handed to the browser as the `view` signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId(Uuid);

impl ViewId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ViewId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self)
    }
}

/// Bounded map of open listing page views. The least recently used view is
/// dropped when the registry is full; its next interaction starts over.
pub struct PageViews {
    views: Mutex<LruCache<ViewId, ListingController>>,
}

impl PageViews {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            views: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Register a freshly loaded view and return its id.
    pub fn open(&self, controller: ListingController) -> ViewId {
        let id = ViewId::new();
        let mut views = mutex_lock(&self.views, SOURCE, "open");

        if let Some((evicted, _)) = views.push(id, controller) {
            counter!(METRIC_PAGE_VIEWS_EVICTED_TOTAL).increment(1);
            debug!(target = SOURCE, view = %evicted, "evicted least recently used view");
        }
        gauge!(METRIC_PAGE_VIEWS_OPEN).set(views.len() as f64);

        id
    }

    /// Run `update` against the view and return a snapshot of the result.
    ///
    /// The lock is held only while `update` runs; rendering happens on the
    /// returned snapshot.
    pub fn update<R>(
        &self,
        id: ViewId,
        update: impl FnOnce(&mut ListingController) -> R,
    ) -> Option<(R, ListingController)> {
        let mut views = mutex_lock(&self.views, SOURCE, "update");
        let controller = views.get_mut(&id)?;
        let outcome = update(&mut *controller);
        Some((outcome, controller.clone()))
    }

    /// Replace the state of an existing view, e.g. after a retry reloaded it.
    pub fn replace(&self, id: ViewId, controller: ListingController) -> bool {
        let mut views = mutex_lock(&self.views, SOURCE, "replace");
        match views.get_mut(&id) {
            Some(slot) => {
                *slot = controller;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.views, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
