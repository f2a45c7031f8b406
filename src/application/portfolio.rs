//! The portfolio landing page.

use crate::config::PortfolioSettings;
use crate::presentation::views::{
    NavigationLinkView, PortfolioSectionView, PortfolioView, SkillView,
};

const CONTACT_ANCHOR: &str = "#contact";
pub const CONTACT_PATH: &str = "/ui/contact";

pub fn portfolio_view(settings: &PortfolioSettings, site_title: &str) -> PortfolioView {
    let headline = if settings.headline.trim().is_empty() {
        site_title.to_string()
    } else {
        settings.headline.clone()
    };

    PortfolioView {
        headline,
        intro: settings.intro.clone(),
        sections: settings
            .sections
            .iter()
            .map(|section| PortfolioSectionView {
                id: section.id.clone(),
                title: section.title.clone(),
                paragraphs: section.paragraphs.clone(),
            })
            .collect(),
        skills: settings
            .skills
            .iter()
            .map(|skill| SkillView {
                name: skill.name.clone(),
                level: skill.level.min(100),
            })
            .collect(),
        resume_url: settings.resume_url.clone(),
        contact_link: NavigationLinkView {
            label: "Get in touch".to_string(),
            href: CONTACT_ANCHOR.to_string(),
            target: None,
            rel: None,
        },
        contact_email: settings.contact_email.clone(),
        contact_action: format!("@post('{CONTACT_PATH}', {{contentType: 'form'}})"),
    }
}
