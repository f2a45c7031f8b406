//! Render passes writing mount-point fragments into a [`Document`].

use askama::Template;

use crate::application::controller::{ListingOptions, ListingView};
use crate::application::post_page::PostPage;
use crate::domain::posts::ReadingSpeed;
use crate::presentation::mounts::{Document, Mount};
use crate::presentation::partials::{
    ActiveFilterPartial, AdjacentLinkPartial, CardView, CategoriesPartial, ErrorPanelPartial,
    FeaturedPartial, FilterLinkView, NotFoundPartial, PaginationPartial, PostContentPartial,
    PostTagsPartial, PostsGridPartial, RecentPostView, RecentPostsPartial, RelatedCardView,
    RelatedPostsPartial, TagsCloudPartial, TextPartial, asset_url, post_href,
};
use crate::presentation::views::TemplateRenderError;

fn fragment<T: Template>(template: T) -> Result<String, TemplateRenderError> {
    template.render().map_err(TemplateRenderError::of::<T>)
}

/// Write every listing mount point for the current view state.
pub fn render_listing(
    document: &mut dyn Document,
    view: &ListingView<'_>,
) -> Result<(), TemplateRenderError> {
    let options: &ListingOptions = view.options;
    let filter = view.filter;

    let featured = match view.featured {
        Some(post) => fragment(FeaturedPartial {
            card: CardView::new(post, &options.reading, filter, usize::MAX),
            video: post.video.as_deref().map(asset_url),
        })?,
        None => String::new(),
    };
    document.patch(Mount::FeaturedPost, featured);

    let cards = view
        .posts
        .iter()
        .map(|post| CardView::new(post, &options.reading, filter, options.card_tag_limit))
        .collect();
    let empty_message = if filter.is_active() {
        "No posts match this filter."
    } else {
        "No posts yet."
    };
    document.patch(
        Mount::PostsGrid,
        fragment(PostsGridPartial {
            cards,
            empty_message,
        })?,
    );

    let pagination = if view.page_count > 1 {
        fragment(PaginationPartial::new(view.page, view.page_count))?
    } else {
        String::new()
    };
    document.patch(Mount::Pagination, pagination);

    let categories = view
        .categories
        .iter()
        .map(|entry| FilterLinkView::category(&entry.name, entry.count, filter))
        .collect();
    document.patch(
        Mount::CategoriesList,
        fragment(CategoriesPartial { categories })?,
    );

    let recent = view
        .recent
        .iter()
        .map(|post| RecentPostView {
            href: post_href(&post.slug),
            title: post.title.clone(),
            date: post.display_date(),
        })
        .collect();
    document.patch(
        Mount::RecentPosts,
        fragment(RecentPostsPartial { posts: recent })?,
    );

    let tags = view
        .tags
        .iter()
        .map(|entry| FilterLinkView::tag(&entry.tag, filter))
        .collect();
    document.patch(Mount::TagsCloud, fragment(TagsCloudPartial { tags })?);

    let active = match ActiveFilterPartial::for_filter(filter) {
        Some(partial) => fragment(partial)?,
        None => String::new(),
    };
    document.patch(Mount::ActiveFilter, active);

    document.patch(Mount::ErrorContainer, String::new());
    Ok(())
}

/// Write the post detail, neighbour links and related posts.
pub fn render_post(
    document: &mut dyn Document,
    page: &PostPage<'_>,
    reading: &ReadingSpeed,
) -> Result<(), TemplateRenderError> {
    let post = page.post;

    document.patch(Mount::PostTitle, fragment(TextPartial { text: &post.title })?);
    document.patch(
        Mount::PostDate,
        fragment(TextPartial {
            text: &post.display_date(),
        })?,
    );
    document.patch(
        Mount::PostReadTime,
        fragment(TextPartial {
            text: &reading.label(post),
        })?,
    );
    document.patch(
        Mount::PostCategory,
        fragment(TextPartial {
            text: &post.category,
        })?,
    );
    document.patch(Mount::PostContent, fragment(PostContentPartial::new(post))?);

    let tags = post
        .tags
        .iter()
        .map(|tag| FilterLinkView::tag_link(tag))
        .collect();
    document.patch(Mount::PostTags, fragment(PostTagsPartial { tags })?);

    let previous = match page.adjacent.previous {
        Some(neighbour) => fragment(AdjacentLinkPartial::previous(neighbour))?,
        None => String::new(),
    };
    document.patch(Mount::PrevPost, previous);

    let next = match page.adjacent.next {
        Some(neighbour) => fragment(AdjacentLinkPartial::next(neighbour))?,
        None => String::new(),
    };
    document.patch(Mount::NextPost, next);

    let cards = page
        .related
        .iter()
        .map(|post| RelatedCardView::new(post))
        .collect();
    document.patch(Mount::RelatedPosts, fragment(RelatedPostsPartial { cards })?);

    document.patch(Mount::ErrorContainer, String::new());
    Ok(())
}

/// Replace the page with the load-failure panel.
pub fn render_load_error(
    document: &mut dyn Document,
    message: String,
    retry_action: String,
) -> Result<(), TemplateRenderError> {
    clear_content(document);
    let panel = fragment(ErrorPanelPartial::new(message, retry_action))?;
    document.patch(Mount::ErrorContainer, panel);
    Ok(())
}

/// Replace the page with the post-not-found panel.
pub fn render_not_found(
    document: &mut dyn Document,
    message: String,
) -> Result<(), TemplateRenderError> {
    clear_content(document);
    let panel = fragment(NotFoundPartial::new(message))?;
    document.patch(Mount::ErrorContainer, panel);
    Ok(())
}

fn clear_content(document: &mut dyn Document) {
    for mount in Mount::ALL {
        if mount != Mount::ErrorContainer && document.mounts().contains(mount) {
            document.write_fragment(mount, String::new());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use folio_types::BlogDocument;

    use super::*;
    use crate::application::controller::{Interaction, ListingController};
    use crate::domain::posts::Catalog;
    use crate::presentation::mounts::{MountSet, PageDocument};

    fn catalog() -> Arc<Catalog> {
        let document: BlogDocument = serde_json::from_str(
            r#"{"posts":[
                {"id":1,"slug":"goa","title":"Goa <beaches>","excerpt":"Sun & sand","date":"2026-01-05",
                 "category":"Travel","tags":["goa","beach"],"featured":true,"coverImage":"images/goa.jpg",
                 "content":[{"type":"paragraph","text":"<script>alert(1)</script>"},
                            {"type":"image","src":"images/sea.jpg","caption":"The sea"}]},
                {"id":2,"slug":"kerala","title":"Kerala","excerpt":"Backwaters","date":"not a date",
                 "category":"Travel","tags":["kerala"]},
                {"id":3,"slug":"dal","title":"Dal","excerpt":"","category":"Food","video":"videos/dal.mp4"}
            ]}"#,
        )
        .expect("document");
        Arc::new(Catalog::from_document(document))
    }

    #[test]
    fn listing_render_fills_every_mount() {
        let controller = ListingController::new(catalog(), ListingOptions::default());
        let mut document = PageDocument::new(MountSet::listing());
        render_listing(&mut document, &controller.view()).expect("render");

        let featured = document.fragment("featured-post");
        assert!(featured.contains("Goa &"));
        assert!(!featured.contains("<beaches>"));
        assert!(featured.contains("src=\"/images/goa.jpg\""));

        let grid = document.fragment("posts-grid");
        assert!(grid.contains("/blogs/kerala.html"));
        assert!(!grid.contains("/blogs/goa.html"));
        assert!(grid.contains("Date unavailable"));

        assert!(document.fragment("pagination").is_empty());
        assert!(document.fragment("categories-list").contains("Travel"));
        assert!(document.fragment("tags-cloud").contains("value=goa"));
        assert!(document.fragment("active-filter").is_empty());
    }

    #[test]
    fn filtered_listing_shows_indicator_and_hides_featured() {
        let mut controller = ListingController::new(catalog(), ListingOptions::default());
        controller.apply(Interaction::SelectCategory("Food".into()));

        let mut document = PageDocument::new(MountSet::listing());
        render_listing(&mut document, &controller.view()).expect("render");

        assert!(document.fragment("featured-post").is_empty());
        assert!(document.fragment("active-filter").contains("Category"));
        assert!(document.fragment("posts-grid").contains("/blogs/dal.html"));
    }

    #[test]
    fn empty_filter_result_is_a_message_not_an_error() {
        let mut controller = ListingController::new(catalog(), ListingOptions::default());
        controller.apply(Interaction::SelectCategory("Nowhere".into()));

        let mut document = PageDocument::new(MountSet::listing());
        render_listing(&mut document, &controller.view()).expect("render");

        assert!(document.fragment("posts-grid").contains("No posts match this filter."));
    }

    #[test]
    fn post_render_escapes_body_and_links_neighbours() {
        let catalog = catalog();
        let page = PostPage::resolve(&catalog, "/blogs/kerala.html", 3).expect("page");
        let mut document = PageDocument::new(MountSet::post());
        render_post(&mut document, &page, &ReadingSpeed::default()).expect("render");

        assert_eq!(document.fragment("post-title"), "Kerala");
        assert_eq!(document.fragment("post-date"), "Date unavailable");
        assert!(document.fragment("prev-post").contains("/blogs/dal.html"));
        assert!(document.fragment("prev-post").contains("← Dal"));
        assert!(document.fragment("next-post").contains("Goa"));
        assert!(document.fragment("related-posts").contains("/blogs/goa.html"));
        assert!(document.fragment("post-tags").contains("/blog?tag=kerala"));

        let page = PostPage::resolve(&catalog, "/blogs/goa.html", 3).expect("page");
        let mut document = PageDocument::new(MountSet::post());
        render_post(&mut document, &page, &ReadingSpeed::default()).expect("render");
        let content = document.fragment("post-content");
        assert!(!content.contains("<script>"));
        assert!(content.contains("src=\"/images/sea.jpg\""));
        assert!(content.contains("The sea"));
        assert!(document.fragment("next-post").is_empty());
    }

    #[test]
    fn post_without_blocks_falls_back_to_placeholder() {
        let catalog = catalog();
        let page = PostPage::resolve(&catalog, "/blogs/dal.html", 3).expect("page");
        let mut document = PageDocument::new(MountSet::post());
        render_post(&mut document, &page, &ReadingSpeed::default()).expect("render");

        let content = document.fragment("post-content");
        assert!(content.contains("No content available for this post."));
        assert!(content.contains("Watch the video:"));
        assert!(content.contains("/videos/dal.mp4"));
        assert!(document.fragment("post-tags").contains("No tags for this post."));
        assert!(document.fragment("related-posts").contains("No related posts found."));
    }

    #[test]
    fn error_panels_clear_the_page() {
        let mut document = PageDocument::new(MountSet::post());
        document.patch(Mount::PostTitle, "stale".to_string());

        render_load_error(
            &mut document,
            "Failed to load blog data: 404".to_string(),
            "@get('/ui/blogs/goa.html')".to_string(),
        )
        .expect("render");

        assert!(document.fragment("post-title").is_empty());
        let panel = document.fragment("error-container");
        assert!(panel.contains("Something went wrong"));
        assert!(panel.contains("Failed to load blog data: 404"));
        assert!(panel.contains("Try Again"));

        render_not_found(&mut document, "Post not found: nowhere".to_string()).expect("render");
        assert!(document.fragment("error-container").contains("Post not found: nowhere"));
        assert!(document.fragment("error-container").contains("href=\"/blog\""));
    }
}
