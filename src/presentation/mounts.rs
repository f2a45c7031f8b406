//! Named mount points of the blog pages and the documents that receive them.
//!
//! A render pass writes one HTML fragment per mount point. Whether the
//! fragment ends up inside a full page or in a datastar patch depends on the
//! [`Document`] it is written to. Writes to mount points the target page does
//! not carry are skipped.

use std::collections::HashMap;

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mount {
    FeaturedPost,
    PostsGrid,
    Pagination,
    CategoriesList,
    RecentPosts,
    TagsCloud,
    ActiveFilter,
    PostTitle,
    PostDate,
    PostReadTime,
    PostCategory,
    PostContent,
    PostTags,
    PrevPost,
    NextPost,
    RelatedPosts,
    ErrorContainer,
}

impl Mount {
    pub const ALL: [Mount; 17] = [
        Mount::FeaturedPost,
        Mount::PostsGrid,
        Mount::Pagination,
        Mount::CategoriesList,
        Mount::RecentPosts,
        Mount::TagsCloud,
        Mount::ActiveFilter,
        Mount::PostTitle,
        Mount::PostDate,
        Mount::PostReadTime,
        Mount::PostCategory,
        Mount::PostContent,
        Mount::PostTags,
        Mount::PrevPost,
        Mount::NextPost,
        Mount::RelatedPosts,
        Mount::ErrorContainer,
    ];

    pub const LISTING: [Mount; 8] = [
        Mount::FeaturedPost,
        Mount::PostsGrid,
        Mount::Pagination,
        Mount::CategoriesList,
        Mount::RecentPosts,
        Mount::TagsCloud,
        Mount::ActiveFilter,
        Mount::ErrorContainer,
    ];

    pub const POST: [Mount; 10] = [
        Mount::PostTitle,
        Mount::PostDate,
        Mount::PostReadTime,
        Mount::PostCategory,
        Mount::PostContent,
        Mount::PostTags,
        Mount::PrevPost,
        Mount::NextPost,
        Mount::RelatedPosts,
        Mount::ErrorContainer,
    ];

    /// DOM id of the element the fragment is placed in.
    pub const fn id(self) -> &'static str {
        match self {
            Mount::FeaturedPost => "featured-post",
            Mount::PostsGrid => "posts-grid",
            Mount::Pagination => "pagination",
            Mount::CategoriesList => "categories-list",
            Mount::RecentPosts => "recent-posts",
            Mount::TagsCloud => "tags-cloud",
            Mount::ActiveFilter => "active-filter",
            Mount::PostTitle => "post-title",
            Mount::PostDate => "post-date",
            Mount::PostReadTime => "post-read-time",
            Mount::PostCategory => "post-category",
            Mount::PostContent => "post-content",
            Mount::PostTags => "post-tags",
            Mount::PrevPost => "prev-post",
            Mount::NextPost => "next-post",
            Mount::RelatedPosts => "related-posts",
            Mount::ErrorContainer => "error-container",
        }
    }

    pub fn from_id(id: &str) -> Option<Mount> {
        Mount::ALL.into_iter().find(|mount| mount.id() == id)
    }

    pub fn selector(self) -> String {
        format!("#{}", self.id())
    }
}

/// The mount points actually present on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountSet {
    bits: u32,
}

impl MountSet {
    pub fn of(mounts: &[Mount]) -> Self {
        let mut set = Self::default();
        for mount in mounts {
            set.insert(*mount);
        }
        set
    }

    pub fn listing() -> Self {
        Self::of(&Mount::LISTING)
    }

    pub fn post() -> Self {
        Self::of(&Mount::POST)
    }

    pub fn insert(&mut self, mount: Mount) {
        self.bits |= Self::bit(mount);
    }

    pub fn remove(&mut self, mount: Mount) {
        self.bits &= !Self::bit(mount);
    }

    pub fn contains(&self, mount: Mount) -> bool {
        self.bits & Self::bit(mount) != 0
    }

    fn bit(mount: Mount) -> u32 {
        1 << (mount as u32)
    }
}

/// Sink for mount-point fragments.
pub trait Document {
    fn mounts(&self) -> &MountSet;

    /// Store `html` for a mount point known to be present.
    fn write_fragment(&mut self, mount: Mount, html: String);

    /// Write `html` to `mount`, skipping mount points the page lacks.
    fn patch(&mut self, mount: Mount, html: String) -> bool {
        if !self.mounts().contains(mount) {
            debug!(
                target = "folio::presentation::mounts",
                mount = mount.id(),
                "mount point absent, fragment skipped"
            );
            return false;
        }
        self.write_fragment(mount, html);
        true
    }
}

/// Fragments collected for a full page render.
#[derive(Debug, Clone, Default)]
pub struct PageDocument {
    mounts: MountSet,
    fragments: HashMap<Mount, String>,
}

impl PageDocument {
    pub fn new(mounts: MountSet) -> Self {
        Self {
            mounts,
            fragments: HashMap::new(),
        }
    }

    /// Rendered fragment for the mount point with DOM id `id`, or empty.
    pub fn fragment(&self, id: &str) -> &str {
        Mount::from_id(id)
            .and_then(|mount| self.fragments.get(&mount))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn has(&self, id: &str) -> bool {
        !self.fragment(id).is_empty()
    }
}

impl Document for PageDocument {
    fn mounts(&self) -> &MountSet {
        &self.mounts
    }

    fn write_fragment(&mut self, mount: Mount, html: String) {
        self.fragments.insert(mount, html);
    }
}
