//! Post-to-post navigation, related posts and sidebar aggregates.

use std::collections::HashMap;

use folio_types::PostId;

use crate::domain::posts::Post;

/// Neighbours of a post in feed order.
///
/// The feed is newest first, so `previous` is the older post that follows
/// the current one and `next` is the newer post before it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Adjacent<'a> {
    pub previous: Option<&'a Post>,
    pub next: Option<&'a Post>,
}

pub fn adjacency<'a>(posts: &'a [Post], current: &PostId) -> Adjacent<'a> {
    let Some(index) = posts.iter().position(|post| &post.id == current) else {
        return Adjacent::default();
    };

    Adjacent {
        previous: posts.get(index + 1),
        next: index.checked_sub(1).and_then(|before| posts.get(before)),
    }
}

/// Up to `limit` other posts in the same category, in feed order.
pub fn related<'a>(post: &Post, posts: &'a [Post], limit: usize) -> Vec<&'a Post> {
    posts
        .iter()
        .filter(|candidate| candidate.id != post.id && candidate.category == post.category)
        .take(limit)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// The `top_n` most used tags, most frequent first; ties keep first-seen order.
pub fn tag_frequency(posts: &[Post], top_n: usize) -> Vec<TagCount> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<TagCount> = Vec::new();

    for tag in posts.iter().flat_map(|post| post.tags.iter()) {
        match slots.get(tag.as_str()) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                slots.insert(tag.as_str(), counts.len());
                counts.push(TagCount {
                    tag: tag.clone(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|left, right| right.count.cmp(&left.count));
    counts.truncate(top_n);
    counts
}

/// The first `count` posts of the feed.
pub fn recent(posts: &[Post], count: usize) -> &[Post] {
    &posts[..count.min(posts.len())]
}
