//! Resolving a single post page from a loaded catalog.

use thiserror::Error;

use crate::application::navigation::{Adjacent, adjacency, related};
use crate::domain::{
    error::DomainError,
    posts::{Catalog, Post},
    slug::slug_from_path,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PostPageError {
    #[error("no post specified in the address")]
    MissingSlug,
    #[error(transparent)]
    NotFound(#[from] DomainError),
}

impl PostPageError {
    pub fn public_message(&self) -> String {
        match self {
            PostPageError::MissingSlug => "No post specified in URL".to_string(),
            PostPageError::NotFound(DomainError::NotFound { key, .. }) => {
                format!("Post not found: {key}")
            }
        }
    }
}

#[derive(Debug)]
pub struct PostPage<'a> {
    pub post: &'a Post,
    pub adjacent: Adjacent<'a>,
    pub related: Vec<&'a Post>,
}

impl<'a> PostPage<'a> {
    /// Resolve the post addressed by `path`, e.g. `/blogs/first-trip.html`.
    pub fn resolve(
        catalog: &'a Catalog,
        path: &str,
        related_limit: usize,
    ) -> Result<Self, PostPageError> {
        let slug = slug_from_path(path).ok_or(PostPageError::MissingSlug)?;
        let post = catalog.require_slug(&slug)?;

        Ok(Self {
            post,
            adjacent: adjacency(catalog.posts(), &post.id),
            related: related(post, catalog.posts(), related_limit),
        })
    }
}

#[cfg(test)]
mod tests {
    use folio_types::BlogDocument;

    use super::*;

    fn catalog() -> Catalog {
        let document: BlogDocument = serde_json::from_str(
            r#"{"posts":[
                {"id":1,"slug":"newest","title":"Newest","category":"Travel"},
                {"id":2,"slug":"middle","title":"Middle","category":"Travel"},
                {"id":3,"slug":"oldest","title":"Oldest","category":"Food"}
            ]}"#,
        )
        .expect("document");
        Catalog::from_document(document)
    }

    #[test]
    fn resolves_post_with_neighbours_and_related() {
        let catalog = catalog();
        let page = PostPage::resolve(&catalog, "/blogs/middle.html", 3).expect("page");

        assert_eq!(page.post.title, "Middle");
        assert_eq!(page.adjacent.previous.map(|post| post.slug.as_str()), Some("oldest"));
        assert_eq!(page.adjacent.next.map(|post| post.slug.as_str()), Some("newest"));
        let related: Vec<&str> = page.related.iter().map(|post| post.slug.as_str()).collect();
        assert_eq!(related, ["newest"]);
    }

    #[test]
    fn unknown_slug_is_not_found() {
        let catalog = catalog();
        let err = PostPage::resolve(&catalog, "/blogs/ghost.html", 3).expect_err("missing");

        assert_eq!(err, PostPageError::NotFound(DomainError::not_found("post", "ghost")));
        assert_eq!(err.public_message(), "Post not found: ghost");
    }

    #[test]
    fn empty_path_has_no_slug() {
        let catalog = catalog();
        let err = PostPage::resolve(&catalog, "/", 3).expect_err("missing slug");
        assert_eq!(err, PostPageError::MissingSlug);
    }
}
