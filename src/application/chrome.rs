use time::OffsetDateTime;

use crate::config::{NavigationLink, SiteSettings};
use crate::presentation::views::{
    BrandView, FooterView, LayoutChrome, NavigationLinkView, NavigationView, PageMetaView,
};

/// Site-wide layout pieces built once from configuration.
#[derive(Clone)]
pub struct ChromeService {
    site: SiteSettings,
}

impl ChromeService {
    pub fn new(site: SiteSettings) -> Self {
        Self { site }
    }

    pub fn site_title(&self) -> &str {
        &self.site.title
    }

    /// Layout chrome for a page rendered now.
    pub fn load(&self) -> LayoutChrome {
        self.load_for_year(OffsetDateTime::now_utc().year())
    }

    fn load_for_year(&self, year: i32) -> LayoutChrome {
        let entries = self
            .site
            .navigation
            .iter()
            .map(map_navigation_link)
            .collect();

        LayoutChrome {
            brand: BrandView {
                title: self.site.title.clone(),
                href: "/".to_string(),
            },
            navigation: NavigationView { entries },
            footer: FooterView {
                copy: format!("© {year} {}. All rights reserved.", self.site.author),
            },
            meta: PageMetaView {
                title: self.site.title.clone(),
                description: self.site.description.clone(),
            },
            datastar_script: self.site.datastar_script.clone(),
        }
    }
}

fn map_navigation_link(link: &NavigationLink) -> NavigationLinkView {
    let external = link.href.starts_with("http://") || link.href.starts_with("https://");

    NavigationLinkView {
        label: link.label.clone(),
        href: link.href.clone(),
        target: external.then(|| "_blank".to_string()),
        rel: external.then(|| "noopener noreferrer".to_string()),
    }
}
