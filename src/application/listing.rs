//! Filtering and pagination of the post feed.

use serde::Deserialize;
use url::form_urlencoded;

use crate::domain::posts::Post;

pub const LISTING_PATH: &str = "/blog";

/// The single active listing filter. A new filter replaces the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    None,
    Category(String),
    Tag(String),
    Search(String),
}

impl Filter {
    /// Build a search filter; blank terms clear filtering.
    pub fn search(term: &str) -> Self {
        let term = term.trim();
        if term.is_empty() {
            Filter::None
        } else {
            Filter::Search(term.to_string())
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Filter::None)
    }
}

/// Posts matching `filter`, in feed order.
pub fn apply_filter<'a>(posts: &'a [Post], filter: &Filter) -> Vec<&'a Post> {
    match filter {
        Filter::None => posts.iter().collect(),
        Filter::Category(name) => posts.iter().filter(|post| post.in_category(name)).collect(),
        Filter::Tag(tag) => posts.iter().filter(|post| post.has_tag(tag)).collect(),
        Filter::Search(term) => {
            let needle = term.trim().to_lowercase();
            if needle.is_empty() {
                return posts.iter().collect();
            }
            posts
                .iter()
                .filter(|post| post.matches_term(&needle))
                .collect()
        }
    }
}

/// The 1-indexed `page` of `items`. Page zero and pages past the end are empty.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }

    let start = match (page - 1).checked_mul(page_size) {
        Some(start) if start < items.len() => start,
        _ => return &[],
    };
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Filter state carried in the address bar.
///
/// `category` and `tag` are mutually exclusive; when both are present the
/// category wins. Search terms are never address-bar state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AddressQuery {
    pub category: Option<String>,
    pub tag: Option<String>,
}

impl AddressQuery {
    pub fn parse(query: &str) -> Self {
        let mut address = AddressQuery::default();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match &*key {
                "category" if address.category.is_none() => {
                    address.category = Some(value.into_owned())
                }
                "tag" if address.tag.is_none() => address.tag = Some(value.into_owned()),
                _ => {}
            }
        }
        address
    }

    pub fn from_filter(filter: &Filter) -> Self {
        match filter {
            Filter::Category(name) => AddressQuery {
                category: Some(name.clone()),
                tag: None,
            },
            Filter::Tag(tag) => AddressQuery {
                category: None,
                tag: Some(tag.clone()),
            },
            Filter::None | Filter::Search(_) => AddressQuery::default(),
        }
    }

    pub fn filter(&self) -> Filter {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .filter(|value| !value.trim().is_empty())
                .map(str::to_string)
        };

        if let Some(category) = present(&self.category) {
            Filter::Category(category)
        } else if let Some(tag) = present(&self.tag) {
            Filter::Tag(tag)
        } else {
            Filter::None
        }
    }

    /// `category=..` or `tag=..`, url-encoded; empty when unfiltered.
    pub fn query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        match self.filter() {
            Filter::Category(name) => {
                serializer.append_pair("category", &name);
            }
            Filter::Tag(tag) => {
                serializer.append_pair("tag", &tag);
            }
            Filter::None | Filter::Search(_) => {}
        }
        serializer.finish()
    }

    /// Listing URL for this address, e.g. `/blog?tag=rust`.
    pub fn listing_url(&self) -> String {
        let query = self.query_string();
        if query.is_empty() {
            LISTING_PATH.to_string()
        } else {
            format!("{LISTING_PATH}?{query}")
        }
    }
}
