//! Explicit state of one listing page view and the transitions user
//! interactions drive through it.

use std::sync::Arc;

use folio_types::CategoryCount;

use crate::application::listing::{AddressQuery, Filter, apply_filter, page_count, paginate};
use crate::application::navigation::{TagCount, recent, tag_frequency};
use crate::domain::posts::{Catalog, Post, ReadingSpeed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingOptions {
    pub page_size: usize,
    pub recent_count: usize,
    pub tag_cloud_limit: usize,
    pub related_limit: usize,
    pub card_tag_limit: usize,
    pub reading: ReadingSpeed,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            page_size: 6,
            recent_count: 3,
            tag_cloud_limit: 15,
            related_limit: 3,
            card_tag_limit: 3,
            reading: ReadingSpeed::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    SelectCategory(String),
    SelectTag(String),
    Search(String),
    GoToPage(usize),
    ClearFilter,
}

/// Address-bar side effect of an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryChange {
    Keep,
    Push(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingUpdate {
    pub history: HistoryChange,
    pub scroll_to_results: bool,
}

/// Everything the renderer needs for one listing render pass.
#[derive(Debug)]
pub struct ListingView<'a> {
    pub filter: &'a Filter,
    pub featured: Option<&'a Post>,
    pub posts: Vec<&'a Post>,
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub categories: &'a [CategoryCount],
    pub recent: &'a [Post],
    pub tags: Vec<TagCount>,
    pub options: &'a ListingOptions,
}

/// State of one listing page view: the loaded catalog, the active filter
/// and the current page.
#[derive(Debug, Clone)]
pub struct ListingController {
    catalog: Arc<Catalog>,
    options: ListingOptions,
    filter: Filter,
    page: usize,
}

impl ListingController {
    pub fn new(catalog: Arc<Catalog>, options: ListingOptions) -> Self {
        Self {
            catalog,
            options,
            filter: Filter::None,
            page: 1,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Adopt the filter carried by the address bar without touching history.
    pub fn restore(&mut self, address: &AddressQuery) {
        self.filter = address.filter();
        self.page = 1;
    }

    pub fn apply(&mut self, interaction: Interaction) -> ListingUpdate {
        match interaction {
            Interaction::SelectCategory(name) => self.replace_filter(Filter::Category(name)),
            Interaction::SelectTag(tag) => self.replace_filter(Filter::Tag(tag)),
            Interaction::Search(term) => self.replace_filter(Filter::search(&term)),
            Interaction::ClearFilter => self.replace_filter(Filter::None),
            Interaction::GoToPage(page) => {
                self.page = page;
                ListingUpdate {
                    history: HistoryChange::Keep,
                    scroll_to_results: true,
                }
            }
        }
    }

    fn replace_filter(&mut self, filter: Filter) -> ListingUpdate {
        self.filter = filter;
        self.page = 1;
        ListingUpdate {
            history: HistoryChange::Push(AddressQuery::from_filter(&self.filter).listing_url()),
            scroll_to_results: false,
        }
    }

    pub fn view(&self) -> ListingView<'_> {
        let posts = self.catalog.posts();
        let featured = if self.filter.is_active() {
            None
        } else {
            self.catalog.featured()
        };

        let mut matches = apply_filter(posts, &self.filter);
        if let Some(featured) = featured {
            matches.retain(|post| !std::ptr::eq(*post, featured));
        }

        let total = matches.len();
        let page_size = self.options.page_size;

        ListingView {
            filter: &self.filter,
            featured,
            posts: paginate(&matches, page_size, self.page).to_vec(),
            total,
            page: self.page,
            page_count: page_count(total, page_size),
            categories: self.catalog.categories(),
            recent: recent(posts, self.options.recent_count),
            tags: tag_frequency(posts, self.options.tag_cloud_limit),
            options: &self.options,
        }
    }
}
