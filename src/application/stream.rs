//! Helpers for building server-driven datastar SSE responses.

use std::{convert::Infallible, fmt};

use async_stream::stream;
use axum::response::{
    IntoResponse, Response,
    sse::{Event, Sse},
};
use datastar::prelude::{ElementPatchMode, ExecuteScript, PatchElements, PatchSignals};
use serde_json::json;

use crate::presentation::mounts::{Document, Mount, MountSet};

/// Builder for composing datastar-compatible SSE responses.
pub struct StreamBuilder {
    events: Vec<Event>,
}

impl StreamBuilder {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an element patch targeting the supplied selector.
    pub fn push_patch(
        &mut self,
        html: String,
        selector: &str,
        mode: ElementPatchMode,
    ) -> &mut Self {
        let event = PatchElements::new(html)
            .selector(selector)
            .mode(mode)
            .write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    /// Queue an inline script for execution on the client.
    pub fn push_script(&mut self, script: String) -> &mut Self {
        let event = ExecuteScript::new(script).write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    /// Queue a datastar signal patch.
    pub fn push_signals(&mut self, payload: &str) -> &mut Self {
        let event = PatchSignals::new(payload).write_as_axum_sse_event();
        self.events.push(event);
        self
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Finalise the builder into an Axum response.
    pub fn into_response(self) -> Response {
        let stream = stream! {
            for event in self.events {
                yield Ok::<Event, Infallible>(event);
            }
        };
        Sse::new(stream).into_response()
    }
}

impl Default for StreamBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A live page on the client: every fragment written to it becomes an
/// inner-HTML patch for the matching mount point.
pub struct PatchStream {
    mounts: MountSet,
    builder: StreamBuilder,
}

impl PatchStream {
    pub fn new(mounts: MountSet) -> Self {
        Self {
            mounts,
            builder: StreamBuilder::new(),
        }
    }

    /// Record a new address-bar entry without reloading the page.
    pub fn push_history(&mut self, url: &str) -> &mut Self {
        let target = json!(url);
        self.builder
            .push_script(format!("window.history.pushState({{}}, '', {target});"));
        self
    }

    /// Smoothly scroll the given mount into view.
    pub fn scroll_into_view(&mut self, mount: Mount) -> &mut Self {
        let id = json!(mount.id());
        self.builder.push_script(format!(
            "document.getElementById({id})?.scrollIntoView({{behavior: 'smooth'}});"
        ));
        self
    }

    pub fn set_document_title(&mut self, title: &str) -> &mut Self {
        let title = json!(title);
        self.builder.push_script(format!("document.title = {title};"));
        self
    }

    /// Set a CSS custom property on the first element matching `selector`.
    pub fn set_style_property(&mut self, selector: &str, property: &str, value: &str) -> &mut Self {
        let (selector, property, value) = (json!(selector), json!(property), json!(value));
        self.builder.push_script(format!(
            "document.querySelector({selector})?.style.setProperty({property}, {value});"
        ));
        self
    }

    /// Point the client at a different page view.
    pub fn push_view(&mut self, view: impl fmt::Display) -> &mut Self {
        let payload = json!({ "view": view.to_string() }).to_string();
        self.builder.push_signals(&payload);
        self
    }

    pub fn len(&self) -> usize {
        self.builder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builder.is_empty()
    }

    pub fn into_response(self) -> Response {
        self.builder.into_response()
    }
}

impl Document for PatchStream {
    fn mounts(&self) -> &MountSet {
        &self.mounts
    }

    fn write_fragment(&mut self, mount: Mount, html: String) {
        self.builder
            .push_patch(html, &mount.selector(), ElementPatchMode::Inner);
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_text(stream: PatchStream) -> String {
        let response = stream.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("stream body");
        String::from_utf8(bytes.to_vec()).expect("utf-8 body")
    }

    #[tokio::test]
    async fn patches_only_mounted_targets() {
        let mut stream = PatchStream::new(MountSet::of(&[Mount::PostsGrid]));
        assert!(stream.patch(Mount::PostsGrid, "<p>grid</p>".to_string()));
        assert!(!stream.patch(Mount::RelatedPosts, "<p>related</p>".to_string()));
        assert_eq!(stream.len(), 1);

        let body = body_text(stream).await;
        assert!(body.contains("datastar-patch-elements"));
        assert!(body.contains("#posts-grid"));
        assert!(body.contains("<p>grid</p>"));
        assert!(!body.contains("related"));
    }

    #[tokio::test]
    async fn history_and_view_updates_are_scripts_and_signals() {
        let mut stream = PatchStream::new(MountSet::listing());
        stream
            .push_history("/blog?tag=it's")
            .scroll_into_view(Mount::PostsGrid)
            .push_view("abc");

        let body = body_text(stream).await;
        assert!(body.contains("window.history.pushState({}, '', \"/blog?tag=it's\");"));
        assert!(body.contains("getElementById(\"posts-grid\")"));
        assert!(body.contains("datastar-patch-signals"));
        assert!(body.contains("\"view\":\"abc\""));
    }
}
