//! Consistency report over a loaded catalog, used by `folio check`.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::domain::posts::{Catalog, derive_categories, parse_iso_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    fn error(message: String) -> Self {
        Self {
            severity: Severity::Error,
            message,
        }
    }

    fn warning(message: String) -> Self {
        Self {
            severity: Severity::Warning,
            message,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub post_count: usize,
    pub category_count: usize,
    pub findings: Vec<Finding>,
}

impl CheckReport {
    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Whether the catalog passes; `strict` also fails on warnings.
    pub fn passed(&self, strict: bool) -> bool {
        self.errors() == 0 && (!strict || self.warnings() == 0)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|finding| finding.severity == severity)
            .count()
    }
}

pub fn check_catalog(catalog: &Catalog) -> CheckReport {
    let mut findings = Vec::new();
    let posts = catalog.posts();

    let mut ids = HashSet::new();
    let mut slugs = HashSet::new();
    for post in posts {
        if !ids.insert(&post.id) {
            findings.push(Finding::error(format!("duplicate post id `{}`", post.id)));
        }
        if !slugs.insert(post.slug.as_str()) {
            findings.push(Finding::error(format!("duplicate post slug `{}`", post.slug)));
        }
        if let Some(raw) = post
            .date
            .as_deref()
            .filter(|raw| parse_iso_date(Some(raw)).is_none())
        {
            findings.push(Finding::warning(format!(
                "post `{}` has an unparseable date `{raw}`",
                post.slug
            )));
        }
    }

    let featured: Vec<&str> = posts
        .iter()
        .filter(|post| post.featured)
        .map(|post| post.slug.as_str())
        .collect();
    if featured.len() > 1 {
        findings.push(Finding::warning(format!(
            "{} posts are featured ({}); `{}` is shown",
            featured.len(),
            featured.join(", "),
            featured[0]
        )));
    }

    if catalog.has_supplied_categories() {
        let derived: HashMap<String, u64> = derive_categories(posts)
            .into_iter()
            .map(|entry| (entry.name, entry.count))
            .collect();
        for entry in catalog.categories() {
            let actual = derived.get(entry.name.as_str()).copied().unwrap_or(0);
            if actual != entry.count {
                findings.push(Finding::warning(format!(
                    "category `{}` lists {} posts but {} carry it",
                    entry.name, entry.count, actual
                )));
            }
        }
    }

    CheckReport {
        post_count: posts.len(),
        category_count: catalog.categories().len(),
        findings,
    }
}
