//! In-memory registry of listing page views.
//!
//! Only per-view interaction state lives here. Blog data itself is never
//! cached across page loads: every full page load fetches it again.

mod lock;
mod views;

pub use views::{PageViews, ViewId};
