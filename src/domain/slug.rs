//! Post slugs: deriving them from titles and locating them in request paths.
//!
//! Titles are transliterated (`pinyin`) before ASCII slugification (`slug`)
//! so a post titled “基线对齐” still gets a readable `ji-xian-dui-qi` slug.

use std::collections::HashSet;

use pinyin::{Pinyin, ToPinyin};
use slug::slugify;
use thiserror::Error;

const MAX_SUFFIX_ATTEMPTS: usize = 32;

/// Errors that can occur while generating a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
}

/// Derive a base slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let transliterated = transliterate_to_ascii(input);
    let candidate = slugify(&transliterated);

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Produce a slug that does not collide according to the supplied predicate.
///
/// `is_unique` returns `true` when the candidate is free. Collisions are
/// retried with a monotonic suffix (`-2`, `-3`, …).
pub fn generate_unique_slug<F>(input: &str, mut is_unique: F) -> Result<String, SlugError>
where
    F: FnMut(&str) -> bool,
{
    let base = derive_slug(input)?;

    if is_unique(&base) {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_unique(&candidate) {
            return Ok(candidate);
        }
    }

    Err(SlugError::Exhausted { base })
}

/// Hands out slugs for one catalog, keeping them unique across posts.
///
/// Explicit slugs from the data file are reserved first so derived slugs never
/// shadow them.
#[derive(Debug, Default)]
pub struct SlugAllocator {
    taken: HashSet<String>,
}

impl SlugAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve an explicit slug. Returns `false` when it was already taken.
    pub fn reserve(&mut self, slug: &str) -> bool {
        self.taken.insert(slug.to_string())
    }

    /// Derive a unique slug from `title`, falling back to `post-<id>`.
    pub fn allocate(&mut self, title: &str, id: &str) -> String {
        let taken = &mut self.taken;
        let mut claim = |candidate: &str| taken.insert(candidate.to_string());

        generate_unique_slug(title, &mut claim)
            .or_else(|_| generate_unique_slug(&format!("post {id}"), &mut claim))
            .unwrap_or_else(|_| format!("post-{id}"))
    }
}

/// Extract the post slug from a request path.
///
/// The slug is the last non-empty path segment with any file extension
/// removed, so `/blogs/first-january-2026.html` yields
/// `first-january-2026`. Returns `None` when no segment remains.
pub fn slug_from_path(path: &str) -> Option<String> {
    let segment = path.split('/').rev().find(|segment| !segment.is_empty())?;
    let stem = match segment.rsplit_once('.') {
        Some((stem, _extension)) if !stem.is_empty() => stem,
        Some(_) => return None,
        None => segment,
    };
    Some(stem.to_string())
}

fn transliterate_to_ascii(input: &str) -> String {
    let mut output = String::with_capacity(input.len());

    for ch in input.chars() {
        if ch.is_ascii() {
            output.push(ch);
            continue;
        }

        match ch.to_pinyin() {
            Some(py) => append_pinyin(&mut output, py),
            None if ch.is_whitespace() => output.push(' '),
            None => output.push(ch),
        }
    }

    output
}

fn append_pinyin(buffer: &mut String, pinyin: Pinyin) {
    if !buffer.is_empty() && !buffer.ends_with(' ') {
        buffer.push(' ');
    }
    buffer.push_str(pinyin.plain());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_slug_transliterates_chinese() {
        let slug = derive_slug("Rust 基础教程").expect("slug");
        assert_eq!(slug, "rust-ji-chu-jiao-cheng");
    }

    #[test]
    fn generate_unique_slug_exhausted() {
        let result =
            generate_unique_slug("Example", |_| false).expect_err("should exhaust attempts");
        assert_eq!(
            result,
            SlugError::Exhausted {
                base: "example".to_string()
            }
        );
    }

    #[test]
    fn allocator_suffixes_colliding_titles() {
        let mut slugs = SlugAllocator::new();
        assert!(slugs.reserve("trip-to-goa"));

        assert_eq!(slugs.allocate("Trip to Goa", "2"), "trip-to-goa-2");
        assert_eq!(slugs.allocate("Trip to Goa", "3"), "trip-to-goa-3");
        assert!(!slugs.reserve("trip-to-goa-2"));
    }

    #[test]
    fn allocator_falls_back_to_id_for_blank_titles() {
        let mut slugs = SlugAllocator::new();
        assert_eq!(slugs.allocate("   ", "17"), "post-17");
        assert_eq!(slugs.allocate("", "17"), "post-17-2");
    }

    #[test]
    fn slug_from_path_strips_extension() {
        assert_eq!(
            slug_from_path("/blogs/first-january-2026.html").as_deref(),
            Some("first-january-2026")
        );
        assert_eq!(slug_from_path("/blogs/plain-slug").as_deref(), Some("plain-slug"));
        assert_eq!(slug_from_path("/blogs/trailing/").as_deref(), Some("trailing"));
    }

    #[test]
    fn slug_from_path_rejects_empty_locations() {
        assert_eq!(slug_from_path("/"), None);
        assert_eq!(slug_from_path(""), None);
        assert_eq!(slug_from_path("/blogs/.html"), None);
    }
}
