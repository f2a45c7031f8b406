use crate::application::error::{ErrorReport, HttpError};
use crate::presentation::mounts::PageDocument;
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An askama failure, tagged with the template type that produced it.
#[derive(Debug, Error)]
#[error("failed to render {template}")]
pub struct TemplateRenderError {
    pub(crate) template: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn of<T: Template>(error: AskamaError) -> Self {
        let template = std::any::type_name::<T>()
            .rsplit("::")
            .next()
            .unwrap_or("template");
        Self { template, error }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        HttpError::from_error(
            "folio::presentation::views",
            StatusCode::INTERNAL_SERVER_ERROR,
            "Page rendering failed",
            &err,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, TemplateRenderError> {
    template.render().map(Html).map_err(TemplateRenderError::of::<T>)
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

/// Fallback page for any path that is neither a route nor a static asset.
pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let view = LayoutContext::new(chrome.with_title("Page Not Found"), MissingPageView::default());
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "folio::presentation::views",
        StatusCode::NOT_FOUND,
        "no route or asset matched",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
    pub target: Option<String>,
    pub rel: Option<String>,
}

impl NavigationLinkView {
    /// Click handler: an in-page anchor whose target is on the current page
    /// scrolls to it smoothly; every link closes the mobile menu.
    pub fn click_action(&self) -> String {
        match in_page_anchor(&self.href) {
            Some(anchor) => anchor_scroll_action(anchor),
            None => "$navOpen = false".to_string(),
        }
    }
}

/// `#about` and `/#about` both name a section of the portfolio page.
fn in_page_anchor(href: &str) -> Option<&str> {
    let anchor = href.strip_prefix('/').unwrap_or(href);
    (anchor.len() > 1 && anchor.starts_with('#')).then_some(anchor)
}

/// Sections carry `scroll-margin-top`, so the target lands below the navbar.
fn anchor_scroll_action(anchor: &str) -> String {
    let selector = serde_json::Value::from(anchor).to_string();
    format!(
        "document.querySelector({selector}) && (evt.preventDefault(), \
         document.querySelector({selector}).scrollIntoView({{behavior: 'smooth'}})); \
         $navOpen = false"
    )
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub datastar_script: String,
}

impl LayoutChrome {
    /// Prefix the document title with a page title, e.g. `Post | Site`.
    pub fn with_title(self, title: &str) -> Self {
        let title = format!("{title} | {}", self.brand.title);
        Self {
            meta: PageMetaView {
                title,
                ..self.meta
            },
            ..self
        }
    }

    pub fn with_description(self, description: &str) -> Self {
        if description.trim().is_empty() {
            return self;
        }
        Self {
            meta: PageMetaView {
                description: description.to_string(),
                ..self.meta
            },
            ..self
        }
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub datastar_script: String,
    /// JSON object for the root `data-signals` attribute.
    pub signals: String,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            datastar_script: chrome.datastar_script,
            signals: json!({ "navOpen": false }).to_string(),
            content,
        }
    }

    /// Register the listing page view the browser talks back to.
    pub fn with_view(self, view: impl std::fmt::Display) -> Self {
        let signals = json!({
            "navOpen": false,
            "view": view.to_string(),
            "search": "",
        })
        .to_string();
        Self { signals, ..self }
    }
}

pub struct BlogPageView {
    pub document: PageDocument,
    pub search_action: String,
    pub restore_action: String,
}

#[derive(Template)]
#[template(path = "blog.html")]
pub struct BlogTemplate {
    pub view: LayoutContext<BlogPageView>,
}

pub struct PostPageView {
    pub document: PageDocument,
    pub cover_image: Option<String>,
    pub listing_href: String,
}

impl PostPageView {
    /// Inline style for the post header background.
    pub fn header_style(&self) -> String {
        self.cover_image
            .as_deref()
            .map(|src| format!("--header-bg: url('{}')", src.replace('\'', "%27")))
            .unwrap_or_default()
    }
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostPageView>,
}

pub struct PortfolioSectionView {
    pub id: String,
    pub title: String,
    pub paragraphs: Vec<String>,
}

pub struct SkillView {
    pub name: String,
    pub level: u8,
}

impl SkillView {
    pub fn reveal_expression(&self) -> String {
        format!("el.style.width = '{}%'", self.level)
    }
}

pub struct PortfolioView {
    pub headline: String,
    pub intro: String,
    pub sections: Vec<PortfolioSectionView>,
    pub skills: Vec<SkillView>,
    pub resume_url: Option<String>,
    pub contact_link: NavigationLinkView,
    pub contact_email: Option<String>,
    pub contact_action: String,
}

#[derive(Template)]
#[template(path = "portfolio.html")]
pub struct PortfolioTemplate {
    pub view: LayoutContext<PortfolioView>,
}

pub struct MissingPageView {
    pub heading: &'static str,
    pub message: &'static str,
    pub links: Vec<NavigationLinkView>,
}

impl Default for MissingPageView {
    fn default() -> Self {
        let link = |label: &str, href: &str| NavigationLinkView {
            label: label.to_string(),
            href: href.to_string(),
            target: None,
            rel: None,
        };
        Self {
            heading: "Nothing here",
            message: "This page has wandered off. The blog and the portfolio are still where you left them.",
            links: vec![link("Read the blog", "/blog"), link("Portfolio", "/")],
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<MissingPageView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrome() -> LayoutChrome {
        LayoutChrome {
            brand: BrandView {
                title: "Folio".to_string(),
                href: "/".to_string(),
            },
            navigation: NavigationView {
                entries: vec![NavigationLinkView {
                    label: "Blog".to_string(),
                    href: "/blog".to_string(),
                    target: None,
                    rel: None,
                }],
            },
            footer: FooterView {
                copy: "© 2026 Folio".to_string(),
            },
            meta: PageMetaView {
                title: "Folio".to_string(),
                description: "Notes".to_string(),
            },
            datastar_script: "/datastar.js".to_string(),
        }
    }

    #[test]
    fn titles_are_prefixed_with_the_page() {
        let chrome = chrome().with_title("Travel <notes>");
        assert_eq!(chrome.meta.title, "Travel <notes> | Folio");
    }

    #[test]
    fn blank_descriptions_keep_the_site_default() {
        assert_eq!(chrome().with_description("  ").meta.description, "Notes");
        assert_eq!(chrome().with_description("Goa").meta.description, "Goa");
    }

    #[test]
    fn listing_pages_carry_the_view_signal() {
        let view = LayoutContext::new(chrome(), ()).with_view("abc");
        let signals: serde_json::Value = serde_json::from_str(&view.signals).expect("json");
        assert_eq!(signals["view"], "abc");
        assert_eq!(signals["navOpen"], false);
    }

    #[test]
    fn in_page_anchors_scroll_smoothly() {
        let link = |href: &str| NavigationLinkView {
            label: "x".to_string(),
            href: href.to_string(),
            target: None,
            rel: None,
        };

        let about = link("/#about").click_action();
        assert!(about.contains("document.querySelector(\"#about\")"));
        assert!(about.contains("evt.preventDefault()"));
        assert!(about.contains("scrollIntoView({behavior: 'smooth'})"));
        assert!(about.ends_with("$navOpen = false"));

        assert!(link("#contact").click_action().contains("\"#contact\""));
        assert_eq!(link("/blog").click_action(), "$navOpen = false");
        assert_eq!(link("#").click_action(), "$navOpen = false");
    }

    #[test]
    fn not_found_page_is_escaped_and_reported() {
        let response = render_not_found_response(chrome().with_title("<script>"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.extensions().get::<ErrorReport>().is_some());
    }

    #[test]
    fn error_page_renders_chrome() {
        let view = LayoutContext::new(chrome(), MissingPageView::default());
        let html = ErrorTemplate { view }.render().expect("render");

        assert!(html.contains("Nothing here"));
        assert!(html.contains("Read the blog"));
        assert!(html.contains("href=\"/blog\""));
        assert!(html.contains("© 2026 Folio"));
        assert!(html.contains("src=\"/datastar.js\""));
    }
}
