//! Fragment view models: one template per mount point.

use askama::Template;
use url::form_urlencoded;

use crate::application::listing::{AddressQuery, Filter, LISTING_PATH};
use crate::domain::posts::{Block, Post, ReadingSpeed};

const INTERACTION_PATH: &str = "/ui/blog";
const TEASER_CHARS: usize = 100;

/// Address of a post page.
pub fn post_href(slug: &str) -> String {
    format!("/blogs/{slug}.html")
}

/// Root-absolute address for a media path from the blog data.
pub fn asset_url(src: &str) -> String {
    let src = src.trim();
    if src.starts_with("http://")
        || src.starts_with("https://")
        || src.starts_with("data:")
        || src.starts_with('/')
    {
        return src.to_string();
    }

    let mut relative = src;
    loop {
        if let Some(rest) = relative.strip_prefix("../") {
            relative = rest;
        } else if let Some(rest) = relative.strip_prefix("./") {
            relative = rest;
        } else {
            break;
        }
    }
    format!("/{relative}")
}

/// Full-page listing address filtered by `tag`.
pub fn tag_href(tag: &str) -> String {
    AddressQuery {
        category: None,
        tag: Some(tag.to_string()),
    }
    .listing_url()
}

pub fn category_href(name: &str) -> String {
    AddressQuery {
        category: Some(name.to_string()),
        tag: None,
    }
    .listing_url()
}

/// Appends the address-bar filter so an evicted view can be rebuilt.
const ADDRESS_SUFFIX: &str = "'&' + location.search.slice(1)";

/// Datastar action sending a listing interaction for the current view.
pub fn listing_action(action: &str, value: Option<&str>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.append_pair("action", action);
    if let Some(value) = value {
        serializer.append_pair("value", value);
    }
    format!(
        "@get('{INTERACTION_PATH}?{}&view=' + $view + {ADDRESS_SUFFIX})",
        serializer.finish()
    )
}

pub fn search_action() -> String {
    format!(
        "@get('{INTERACTION_PATH}?action=search&view=' + $view + '&value=' + encodeURIComponent($search) + {ADDRESS_SUFFIX})"
    )
}

/// Re-derive the listing from the address bar after back/forward navigation.
pub fn restore_action() -> String {
    format!("@get('{INTERACTION_PATH}?action=restore&view=' + $view + {ADDRESS_SUFFIX})")
}

/// Retry carries the address filter and the view to reload in place.
pub fn listing_retry_action(address: &AddressQuery) -> String {
    let query = address.query_string();
    if query.is_empty() {
        format!("@get('{INTERACTION_PATH}/retry?view=' + $view)")
    } else {
        format!("@get('{INTERACTION_PATH}/retry?{query}&view=' + $view)")
    }
}

pub fn post_retry_action(file: &str) -> String {
    let file = form_urlencoded::byte_serialize(file.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!("@get('/ui/blogs/{file}')")
}

/// A category or tag link. `action` is set where the link is handled in
/// place by the listing page.
#[derive(Debug, Clone)]
pub struct FilterLinkView {
    pub label: String,
    pub href: String,
    pub action: Option<String>,
    pub count: Option<u64>,
    pub active: bool,
}

impl FilterLinkView {
    pub fn tag(tag: &str, filter: &Filter) -> Self {
        Self {
            label: tag.to_string(),
            href: tag_href(tag),
            action: Some(listing_action("tag", Some(tag))),
            count: None,
            active: matches!(filter, Filter::Tag(current) if current == tag),
        }
    }

    pub fn category(name: &str, count: u64, filter: &Filter) -> Self {
        Self {
            label: name.to_string(),
            href: category_href(name),
            action: Some(listing_action("category", Some(name))),
            count: Some(count),
            active: matches!(filter, Filter::Category(current) if current == name),
        }
    }

    /// Plain link back to the filtered listing, used off the listing page.
    pub fn tag_link(tag: &str) -> Self {
        Self {
            label: tag.to_string(),
            href: tag_href(tag),
            action: None,
            count: None,
            active: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostMetaView {
    pub category: String,
    pub date: String,
    pub read_time: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CardView {
    pub href: String,
    pub title: String,
    pub excerpt: String,
    pub cover: Option<String>,
    pub meta: PostMetaView,
    pub tags: Vec<FilterLinkView>,
}

impl CardView {
    pub fn new(post: &Post, reading: &ReadingSpeed, filter: &Filter, tag_limit: usize) -> Self {
        Self {
            href: post_href(&post.slug),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            cover: post.cover_image.as_deref().map(asset_url),
            meta: PostMetaView {
                category: post.category.clone(),
                date: post.display_date(),
                read_time: Some(reading.label(post)),
            },
            tags: post
                .tags
                .iter()
                .take(tag_limit)
                .map(|tag| FilterLinkView::tag(tag, filter))
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "partials/featured.html")]
pub struct FeaturedPartial {
    pub card: CardView,
    pub video: Option<String>,
}

#[derive(Template)]
#[template(path = "partials/posts_grid.html")]
pub struct PostsGridPartial {
    pub cards: Vec<CardView>,
    pub empty_message: &'static str,
}

#[derive(Debug, Clone)]
pub struct PageLinkView {
    pub number: usize,
    pub action: String,
    pub current: bool,
}

#[derive(Template)]
#[template(path = "partials/pagination.html")]
pub struct PaginationPartial {
    pub previous: Option<String>,
    pub pages: Vec<PageLinkView>,
    pub next: Option<String>,
}

impl PaginationPartial {
    pub fn new(page: usize, page_count: usize) -> Self {
        let goto = |number: usize| listing_action("page", Some(&number.to_string()));
        Self {
            previous: (page > 1 && page <= page_count).then(|| goto(page - 1)),
            pages: (1..=page_count)
                .map(|number| PageLinkView {
                    number,
                    action: goto(number),
                    current: number == page,
                })
                .collect(),
            next: (page < page_count).then(|| goto(page + 1)),
        }
    }
}

#[derive(Template)]
#[template(path = "partials/categories.html")]
pub struct CategoriesPartial {
    pub categories: Vec<FilterLinkView>,
}

#[derive(Debug, Clone)]
pub struct RecentPostView {
    pub href: String,
    pub title: String,
    pub date: String,
}

#[derive(Template)]
#[template(path = "partials/recent_posts.html")]
pub struct RecentPostsPartial {
    pub posts: Vec<RecentPostView>,
}

#[derive(Template)]
#[template(path = "partials/tags_cloud.html")]
pub struct TagsCloudPartial {
    pub tags: Vec<FilterLinkView>,
}

#[derive(Template)]
#[template(path = "partials/active_filter.html")]
pub struct ActiveFilterPartial {
    pub kind: &'static str,
    pub value: String,
    pub clear_action: String,
}

impl ActiveFilterPartial {
    pub fn for_filter(filter: &Filter) -> Option<Self> {
        let (kind, value) = match filter {
            Filter::None => return None,
            Filter::Category(name) => ("Category", name.clone()),
            Filter::Tag(tag) => ("Tag", tag.clone()),
            Filter::Search(term) => ("Search", term.clone()),
        };
        Some(Self {
            kind,
            value,
            clear_action: listing_action("clear", None),
        })
    }
}

/// Outcome line under the contact form.
#[derive(Template)]
#[template(path = "partials/contact_status.html")]
pub struct ContactStatusPartial {
    pub sent: bool,
    pub message: String,
}

#[derive(Template)]
#[template(path = "partials/error_panel.html")]
pub struct ErrorPanelPartial {
    pub message: String,
    pub retry_action: String,
    pub back_href: &'static str,
}

impl ErrorPanelPartial {
    pub fn new(message: String, retry_action: String) -> Self {
        Self {
            message,
            retry_action,
            back_href: LISTING_PATH,
        }
    }
}

#[derive(Template)]
#[template(path = "partials/not_found.html")]
pub struct NotFoundPartial {
    pub message: String,
    pub back_href: &'static str,
}

impl NotFoundPartial {
    pub fn new(message: String) -> Self {
        Self {
            message,
            back_href: LISTING_PATH,
        }
    }
}

/// Escaped single line of text, e.g. the post title.
#[derive(Template)]
#[template(source = "{{ text }}", ext = "html")]
pub struct TextPartial<'a> {
    pub text: &'a str,
}

#[derive(Debug, Clone)]
pub struct ImageView {
    pub src: String,
    pub caption: Option<String>,
}

#[derive(Debug, Clone)]
pub enum BodyBlockView {
    Paragraph(String),
    Image(ImageView),
    Video(String),
}

impl From<&Block> for BodyBlockView {
    fn from(block: &Block) -> Self {
        match block {
            Block::Paragraph(text) => BodyBlockView::Paragraph(text.clone()),
            Block::Image { src, caption } => BodyBlockView::Image(ImageView {
                src: asset_url(src),
                caption: caption.clone(),
            }),
            Block::Video(src) => BodyBlockView::Video(asset_url(src)),
        }
    }
}

/// Body shown for posts without content blocks.
#[derive(Debug, Clone)]
pub struct ContentFallbackView {
    pub text: String,
    pub video: Option<String>,
}

#[derive(Template)]
#[template(path = "partials/post_content.html")]
pub struct PostContentPartial {
    pub blocks: Vec<BodyBlockView>,
    pub fallback: Option<ContentFallbackView>,
}

impl PostContentPartial {
    pub fn new(post: &Post) -> Self {
        if !post.body.is_empty() {
            return Self {
                blocks: post.body.iter().map(BodyBlockView::from).collect(),
                fallback: None,
            };
        }

        let text = if post.excerpt.trim().is_empty() {
            "No content available for this post.".to_string()
        } else {
            post.excerpt.clone()
        };
        Self {
            blocks: Vec::new(),
            fallback: Some(ContentFallbackView {
                text,
                video: post.video.as_deref().map(asset_url),
            }),
        }
    }
}

#[derive(Template)]
#[template(path = "partials/post_tags.html")]
pub struct PostTagsPartial {
    pub tags: Vec<FilterLinkView>,
}

#[derive(Template)]
#[template(path = "partials/adjacent_link.html")]
pub struct AdjacentLinkPartial {
    pub href: String,
    pub label: String,
    pub rel: &'static str,
}

impl AdjacentLinkPartial {
    pub fn previous(post: &Post) -> Self {
        Self {
            href: post_href(&post.slug),
            label: format!("← {}", post.title),
            rel: "prev",
        }
    }

    pub fn next(post: &Post) -> Self {
        Self {
            href: post_href(&post.slug),
            label: format!("{} →", post.title),
            rel: "next",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelatedCardView {
    pub href: String,
    pub title: String,
    pub cover: Option<String>,
    pub category: String,
    pub date: String,
    pub teaser: String,
}

impl RelatedCardView {
    pub fn new(post: &Post) -> Self {
        Self {
            href: post_href(&post.slug),
            title: post.title.clone(),
            cover: post.cover_image.as_deref().map(asset_url),
            category: post.category.clone(),
            date: post.display_date(),
            teaser: teaser(&post.excerpt),
        }
    }
}

#[derive(Template)]
#[template(path = "partials/related_posts.html")]
pub struct RelatedPostsPartial {
    pub cards: Vec<RelatedCardView>,
}

fn teaser(excerpt: &str) -> String {
    let excerpt = excerpt.trim();
    if excerpt.is_empty() {
        return "Read more...".to_string();
    }
    match excerpt.char_indices().nth(TEASER_CHARS) {
        Some((cut, _)) => format!("{}...", &excerpt[..cut]),
        None => excerpt.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_media_paths_become_root_absolute() {
        assert_eq!(asset_url("images/goa.jpg"), "/images/goa.jpg");
        assert_eq!(asset_url("../images/goa.jpg"), "/images/goa.jpg");
        assert_eq!(asset_url("/media/a.mp4"), "/media/a.mp4");
        assert_eq!(
            asset_url("https://cdn.example.com/a.jpg"),
            "https://cdn.example.com/a.jpg"
        );
    }

    #[test]
    fn actions_encode_values() {
        assert_eq!(
            listing_action("tag", Some("road trip's")),
            "@get('/ui/blog?action=tag&value=road+trip%27s&view=' + $view + '&' + location.search.slice(1))"
        );
        assert_eq!(
            listing_action("clear", None),
            "@get('/ui/blog?action=clear&view=' + $view + '&' + location.search.slice(1))"
        );
    }

    #[test]
    fn retry_actions_keep_the_address() {
        let address = AddressQuery::parse("category=Travel");
        assert_eq!(
            listing_retry_action(&address),
            "@get('/ui/blog/retry?category=Travel&view=' + $view)"
        );
        assert_eq!(
            listing_retry_action(&AddressQuery::default()),
            "@get('/ui/blog/retry?view=' + $view)"
        );
        assert_eq!(
            post_retry_action("goa trip.html"),
            "@get('/ui/blogs/goa%20trip.html')"
        );
    }

    #[test]
    fn pagination_marks_current_page() {
        let partial = PaginationPartial::new(2, 3);
        let current: Vec<usize> = partial
            .pages
            .iter()
            .filter(|page| page.current)
            .map(|page| page.number)
            .collect();

        assert_eq!(current, [2]);
        assert!(partial.previous.is_some());
        assert!(partial.next.is_some());
        assert!(PaginationPartial::new(3, 3).next.is_none());
    }

    #[test]
    fn teasers_are_cut_at_one_hundred_chars() {
        let long = "a".repeat(150);
        assert_eq!(teaser(&long).chars().count(), TEASER_CHARS + 3);
        assert_eq!(teaser("Short"), "Short");
        let exact = "y".repeat(TEASER_CHARS);
        assert_eq!(teaser(&exact), exact);
        assert_eq!(teaser(""), "Read more...");
    }

    #[test]
    fn text_partial_escapes_markup() {
        let html = TextPartial {
            text: "<b>bold</b> & more",
        }
        .render()
        .expect("render");
        assert!(!html.contains("<b>"));
        assert!(html.contains("bold"));
    }

    #[test]
    fn active_filter_names_the_filter_kind() {
        assert!(ActiveFilterPartial::for_filter(&Filter::None).is_none());
        let partial =
            ActiveFilterPartial::for_filter(&Filter::Search("goa".into())).expect("filter");
        assert_eq!(partial.kind, "Search");
        assert!(partial.clear_action.contains("action=clear"));
    }
}
