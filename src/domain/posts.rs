//! Normalized posts and the per-view catalog built from the blog data document.

use std::collections::HashMap;

use folio_types::{BlogDocument, CategoryCount, ContentBlock, PostId, PostRecord};
use time::{Date, format_description::FormatItem, macros::format_description};

use super::error::DomainError;
use super::slug::SlugAllocator;

pub const HUMAN_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");
const ISO_DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub const UNCATEGORIZED: &str = "Uncategorized";
pub const DATE_PLACEHOLDER: &str = "Date unavailable";

/// Body block of a post after normalization.
///
/// Blocks of unknown type and videos without a source are dropped while the
/// catalog is built, so every block here renders something.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(String),
    Image {
        src: String,
        caption: Option<String>,
    },
    Video(String),
}

#[derive(Debug, Clone)]
pub struct Post {
    pub id: PostId,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub date: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub video: Option<String>,
    pub read_time: Option<String>,
    pub featured: bool,
    pub body: Vec<Block>,
}

impl Post {
    fn from_record(record: PostRecord, slug: String) -> Self {
        let PostRecord {
            id,
            slug: _,
            title,
            excerpt,
            date,
            category,
            subcategory,
            tags,
            cover_image,
            video,
            read_time,
            featured,
            content,
        } = record;

        let category = non_blank(category).unwrap_or_else(|| UNCATEGORIZED.to_string());
        let body = content
            .unwrap_or_default()
            .into_iter()
            .filter_map(normalize_block)
            .collect();

        Self {
            id,
            slug,
            title,
            excerpt: excerpt.unwrap_or_default(),
            date: non_blank(date),
            category,
            subcategory: non_blank(subcategory),
            tags: tags.unwrap_or_default(),
            cover_image: non_blank(cover_image),
            video: non_blank(video),
            read_time: non_blank(read_time),
            featured,
            body,
        }
    }

    /// True when the post belongs to `name` as category or subcategory.
    pub fn in_category(&self, name: &str) -> bool {
        self.category == name || self.subcategory.as_deref() == Some(name)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }

    /// Case-insensitive substring match over title, excerpt, tags and category.
    ///
    /// `needle` must already be lowercased.
    pub fn matches_term(&self, needle: &str) -> bool {
        let hit = |haystack: &str| haystack.to_lowercase().contains(needle);

        hit(&self.title)
            || hit(&self.excerpt)
            || self.tags.iter().any(|tag| hit(tag))
            || hit(&self.category)
    }

    /// Human-readable publication date, or the placeholder.
    pub fn display_date(&self) -> String {
        format_human_date(self.date.as_deref())
    }

    /// Number of characters the reading-time estimate is based on.
    pub fn text_len(&self) -> usize {
        if self.body.is_empty() {
            return self.excerpt.chars().count();
        }

        self.body
            .iter()
            .map(|block| match block {
                Block::Paragraph(text) => text.chars().count(),
                Block::Image { caption, .. } => {
                    caption.as_deref().map_or(0, |caption| caption.chars().count())
                }
                Block::Video(_) => 0,
            })
            .sum()
    }
}

/// Reading-speed heuristic used when a post carries no explicit read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingSpeed {
    pub words_per_minute: u32,
    pub chars_per_word: u32,
}

impl Default for ReadingSpeed {
    fn default() -> Self {
        Self {
            words_per_minute: 200,
            chars_per_word: 5,
        }
    }
}

impl ReadingSpeed {
    /// Estimated minutes for `chars` characters of text, never below one.
    pub fn minutes(&self, chars: usize) -> u64 {
        let chars_per_minute =
            u64::from(self.words_per_minute.max(1)) * u64::from(self.chars_per_word.max(1));
        (chars as u64).div_ceil(chars_per_minute).max(1)
    }

    /// The post's explicit read time, or an estimate such as `3 min read`.
    pub fn label(&self, post: &Post) -> String {
        match post.read_time.as_deref() {
            Some(explicit) => explicit.to_string(),
            None => format!("{} min read", self.minutes(post.text_len())),
        }
    }
}

/// Format an ISO date (`2026-01-01`, optionally followed by a time) as
/// `January 1, 2026`.
pub fn format_human_date(raw: Option<&str>) -> String {
    parse_iso_date(raw)
        .and_then(|date| date.format(HUMAN_DATE_FORMAT).ok())
        .unwrap_or_else(|| DATE_PLACEHOLDER.to_string())
}

pub fn parse_iso_date(raw: Option<&str>) -> Option<Date> {
    let raw = raw?.trim();
    let day = raw
        .split(|ch: char| ch == 'T' || ch == 't' || ch.is_whitespace())
        .next()?;
    Date::parse(day, ISO_DATE_FORMAT).ok()
}

/// The content of one page view: every post in feed order plus the
/// category index shown in the sidebar.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    posts: Vec<Post>,
    categories: Vec<CategoryCount>,
    supplied_categories: bool,
}

impl Catalog {
    pub fn from_document(document: BlogDocument) -> Self {
        let BlogDocument { posts, categories } = document;

        let mut slugs = SlugAllocator::new();
        for record in &posts {
            if let Some(slug) = record.slug.as_deref().filter(|slug| !slug.trim().is_empty()) {
                slugs.reserve(slug.trim());
            }
        }

        let posts: Vec<Post> = posts
            .into_iter()
            .map(|record| {
                let slug = match record.slug.as_deref().map(str::trim) {
                    Some(explicit) if !explicit.is_empty() => explicit.to_string(),
                    _ => slugs.allocate(&record.title, &record.id.to_string()),
                };
                Post::from_record(record, slug)
            })
            .collect();

        let supplied_categories = categories.is_some();
        let categories = match categories {
            Some(index) => index.into_entries(),
            None => derive_categories(&posts),
        };

        Self {
            posts,
            categories,
            supplied_categories,
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn categories(&self) -> &[CategoryCount] {
        &self.categories
    }

    /// Whether the category index came from the document rather than
    /// being derived from the posts.
    pub fn has_supplied_categories(&self) -> bool {
        self.supplied_categories
    }

    /// The first featured post in feed order.
    pub fn featured(&self) -> Option<&Post> {
        self.posts.iter().find(|post| post.featured)
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.slug == slug)
    }

    pub fn require_slug(&self, slug: &str) -> Result<&Post, DomainError> {
        self.find_by_slug(slug)
            .ok_or_else(|| DomainError::not_found("post", slug))
    }
}

/// Aggregate post categories in first-seen order.
pub fn derive_categories(posts: &[Post]) -> Vec<CategoryCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<CategoryCount> = Vec::new();

    for post in posts {
        match index.get(post.category.as_str()) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                index.insert(post.category.as_str(), counts.len());
                counts.push(CategoryCount {
                    name: post.category.clone(),
                    count: 1,
                });
            }
        }
    }

    counts
}

fn normalize_block(block: ContentBlock) -> Option<Block> {
    match block {
        ContentBlock::Paragraph { text } => Some(Block::Paragraph(text)),
        ContentBlock::Image { src, caption } => Some(Block::Image {
            src,
            caption: non_blank(caption),
        }),
        ContentBlock::Video { src } => non_blank(src).map(Block::Video),
        ContentBlock::Unknown => None,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
