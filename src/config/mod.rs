//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    net::SocketAddr,
    num::{NonZeroU32, NonZeroUsize},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::controller::ListingOptions;
use crate::domain::posts::ReadingSpeed;

mod cli;

pub use cli::{
    CheckArgs, CliArgs, Command, ContentOverrides, LoggingOverrides, ServeArgs, ServeOverrides,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "folio";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_GRACEFUL_SHUTDOWN_SECS: u64 = 30;
const DEFAULT_CONTENT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PAGE_SIZE: u32 = 6;
const DEFAULT_RECENT_COUNT: u32 = 3;
const DEFAULT_TAG_CLOUD_LIMIT: u32 = 15;
const DEFAULT_RELATED_LIMIT: u32 = 3;
const DEFAULT_CARD_TAG_LIMIT: u32 = 3;
const DEFAULT_WORDS_PER_MINUTE: u32 = 200;
const DEFAULT_CHARS_PER_WORD: u32 = 5;
const DEFAULT_VIEWS_CAPACITY: u32 = 256;
const DEFAULT_SITE_TITLE: &str = "Folio";
const DEFAULT_SITE_DESCRIPTION: &str = "Notes, travels and projects.";
const DEFAULT_ASSETS_DIR: &str = "public";
const DEFAULT_DATASTAR_SCRIPT: &str =
    "https://cdn.jsdelivr.net/gh/starfederation/datastar@1.0.0-RC.6/bundles/datastar.js";

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub content: ContentSettings,
    pub listing: ListingSettings,
    pub reading: ReadingSpeed,
    pub views: ViewsSettings,
    pub site: SiteSettings,
    pub portfolio: PortfolioSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    pub graceful_shutdown: Duration,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentLocation {
    Url(Url),
    Path(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub location: ContentLocation,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ListingSettings {
    pub page_size: NonZeroU32,
    pub recent_count: u32,
    pub tag_cloud_limit: u32,
    pub related_limit: u32,
    pub card_tag_limit: u32,
}

#[derive(Debug, Clone)]
pub struct ViewsSettings {
    pub capacity: NonZeroUsize,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub title: String,
    pub description: String,
    pub author: String,
    pub datastar_script: String,
    pub navigation: Vec<NavigationLink>,
    /// Directory served under the site root for media and stylesheets.
    pub assets_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NavigationLink {
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, Default)]
pub struct PortfolioSettings {
    pub headline: String,
    pub intro: String,
    pub sections: Vec<PortfolioSection>,
    pub skills: Vec<Skill>,
    pub resume_url: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PortfolioSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    pub name: String,
    /// Percentage in `0..=100`.
    pub level: u8,
}

impl ListingSettings {
    pub fn options(&self, reading: ReadingSpeed) -> ListingOptions {
        ListingOptions {
            page_size: self.page_size.get() as usize,
            recent_count: self.recent_count as usize,
            tag_cloud_limit: self.tag_cloud_limit as usize,
            related_limit: self.related_limit as usize,
            card_tag_limit: self.card_tag_limit as usize,
            reading,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("FOLIO").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Check(args)) => {
            raw.apply_content_overrides(&args.content);
            raw.apply_logging_overrides(&args.logging);
        }
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    content: RawContentSettings,
    listing: RawListingSettings,
    reading: RawReadingSettings,
    views: RawViewsSettings,
    site: RawSiteSettings,
    portfolio: RawPortfolioSettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.server_port {
            self.server.port = Some(port);
        }
        if let Some(seconds) = overrides.server_graceful_shutdown_seconds {
            self.server.graceful_shutdown_seconds = Some(seconds);
        }
        if let Some(size) = overrides.listing_page_size {
            self.listing.page_size = Some(size.into());
        }
        if let Some(capacity) = overrides.views_capacity {
            self.views.capacity = Some(capacity.into());
        }

        self.apply_content_overrides(&overrides.content);
        self.apply_logging_overrides(&overrides.logging);
    }

    /// A content location given on the command line replaces both file
    /// and environment locations.
    fn apply_content_overrides(&mut self, overrides: &ContentOverrides) {
        if let Some(url) = overrides.content_url.as_ref() {
            self.content.url = Some(url.clone());
            self.content.path = None;
        }
        if let Some(path) = overrides.content_path.as_ref() {
            self.content.path = Some(path.clone());
            self.content.url = None;
        }
    }

    fn apply_logging_overrides(&mut self, overrides: &LoggingOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            content,
            listing,
            reading,
            views,
            site,
            portfolio,
        } = raw;

        Ok(Self {
            server: build_server_settings(server)?,
            logging: build_logging_settings(logging)?,
            content: build_content_settings(content)?,
            listing: build_listing_settings(listing)?,
            reading: build_reading_settings(reading)?,
            views: build_views_settings(views)?,
            site: build_site_settings(site)?,
            portfolio: build_portfolio_settings(portfolio)?,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = server.port.unwrap_or(DEFAULT_PORT);
    if port == 0 {
        return Err(LoadError::invalid(
            "server.port",
            "port must be greater than zero",
        ));
    }

    let addr =
        parse_socket_addr(&host, port).map_err(|reason| LoadError::invalid("server.addr", reason))?;

    let graceful_secs = server
        .graceful_shutdown_seconds
        .unwrap_or(DEFAULT_GRACEFUL_SHUTDOWN_SECS);
    if graceful_secs == 0 {
        return Err(LoadError::invalid(
            "server.graceful_shutdown_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ServerSettings {
        addr,
        graceful_shutdown: Duration::from_secs(graceful_secs),
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let url = blank_to_none(content.url);
    let path = content
        .path
        .filter(|path| !path.as_os_str().is_empty());

    let location = match (url, path) {
        (Some(_), Some(_)) => {
            return Err(LoadError::invalid(
                "content",
                "set either content.url or content.path, not both",
            ));
        }
        (None, None) => {
            return Err(LoadError::invalid(
                "content",
                "one of content.url or content.path is required",
            ));
        }
        (Some(url), None) => {
            let parsed = Url::parse(&url)
                .map_err(|err| LoadError::invalid("content.url", format!("invalid url: {err}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(LoadError::invalid(
                    "content.url",
                    "only http and https urls are supported",
                ));
            }
            ContentLocation::Url(parsed)
        }
        (None, Some(path)) => ContentLocation::Path(path),
    };

    let timeout_secs = content.timeout_seconds.unwrap_or(DEFAULT_CONTENT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        return Err(LoadError::invalid(
            "content.timeout_seconds",
            "must be greater than zero",
        ));
    }

    Ok(ContentSettings {
        location,
        timeout: Duration::from_secs(timeout_secs),
    })
}

fn build_listing_settings(listing: RawListingSettings) -> Result<ListingSettings, LoadError> {
    let page_size = non_zero_u32(
        listing.page_size.unwrap_or(DEFAULT_PAGE_SIZE.into()),
        "listing.page_size",
    )?;

    Ok(ListingSettings {
        page_size,
        recent_count: non_zero_u32(
            listing.recent_count.unwrap_or(DEFAULT_RECENT_COUNT.into()),
            "listing.recent_count",
        )?
        .get(),
        tag_cloud_limit: non_zero_u32(
            listing
                .tag_cloud_limit
                .unwrap_or(DEFAULT_TAG_CLOUD_LIMIT.into()),
            "listing.tag_cloud_limit",
        )?
        .get(),
        related_limit: non_zero_u32(
            listing.related_limit.unwrap_or(DEFAULT_RELATED_LIMIT.into()),
            "listing.related_limit",
        )?
        .get(),
        card_tag_limit: non_zero_u32(
            listing
                .card_tag_limit
                .unwrap_or(DEFAULT_CARD_TAG_LIMIT.into()),
            "listing.card_tag_limit",
        )?
        .get(),
    })
}

fn build_reading_settings(reading: RawReadingSettings) -> Result<ReadingSpeed, LoadError> {
    let words_per_minute = non_zero_u32(
        reading
            .words_per_minute
            .unwrap_or(DEFAULT_WORDS_PER_MINUTE.into()),
        "reading.words_per_minute",
    )?;
    let chars_per_word = non_zero_u32(
        reading
            .chars_per_word
            .unwrap_or(DEFAULT_CHARS_PER_WORD.into()),
        "reading.chars_per_word",
    )?;

    Ok(ReadingSpeed {
        words_per_minute: words_per_minute.get(),
        chars_per_word: chars_per_word.get(),
    })
}

fn build_views_settings(views: RawViewsSettings) -> Result<ViewsSettings, LoadError> {
    let capacity = non_zero_u32(
        views.capacity.unwrap_or(DEFAULT_VIEWS_CAPACITY.into()),
        "views.capacity",
    )?;
    let capacity = usize::try_from(capacity.get())
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| {
            LoadError::invalid("views.capacity", "value exceeds supported range for usize")
        })?;

    Ok(ViewsSettings { capacity })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let title = blank_to_none(site.title).unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string());
    let description =
        blank_to_none(site.description).unwrap_or_else(|| DEFAULT_SITE_DESCRIPTION.to_string());
    let author = blank_to_none(site.author).unwrap_or_else(|| title.clone());
    let datastar_script = blank_to_none(site.datastar_script)
        .unwrap_or_else(|| DEFAULT_DATASTAR_SCRIPT.to_string());

    let navigation = match site.navigation {
        Some(links) => {
            for link in &links {
                if link.label.trim().is_empty() || link.href.trim().is_empty() {
                    return Err(LoadError::invalid(
                        "site.navigation",
                        "every link needs a label and an href",
                    ));
                }
            }
            links
        }
        None => default_navigation(),
    };

    let assets_dir = site
        .assets_dir
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR));

    Ok(SiteSettings {
        title,
        description,
        author,
        datastar_script,
        navigation,
        assets_dir,
    })
}

fn build_portfolio_settings(
    portfolio: RawPortfolioSettings,
) -> Result<PortfolioSettings, LoadError> {
    let mut seen = Vec::new();
    for section in &portfolio.sections {
        if section.id.trim().is_empty() {
            return Err(LoadError::invalid(
                "portfolio.sections",
                "section id must not be empty",
            ));
        }
        if seen.contains(&section.id) {
            return Err(LoadError::invalid(
                "portfolio.sections",
                format!("duplicate section id `{}`", section.id),
            ));
        }
        seen.push(section.id.clone());
    }

    let skills = portfolio
        .skills
        .into_iter()
        .map(|skill| Skill {
            name: skill.name,
            level: skill.level.clamp(0, 100) as u8,
        })
        .collect();

    Ok(PortfolioSettings {
        headline: portfolio.headline.unwrap_or_default(),
        intro: portfolio.intro.unwrap_or_default(),
        sections: portfolio.sections,
        skills,
        resume_url: blank_to_none(portfolio.resume_url),
        contact_email: blank_to_none(portfolio.contact_email),
    })
}

fn default_navigation() -> Vec<NavigationLink> {
    vec![
        NavigationLink {
            label: "Home".to_string(),
            href: "/".to_string(),
        },
        NavigationLink {
            label: "Blog".to_string(),
            href: "/blog".to_string(),
        },
    ]
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    port: Option<u16>,
    graceful_shutdown_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    url: Option<String>,
    path: Option<PathBuf>,
    timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawListingSettings {
    page_size: Option<u64>,
    recent_count: Option<u64>,
    tag_cloud_limit: Option<u64>,
    related_limit: Option<u64>,
    card_tag_limit: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawReadingSettings {
    words_per_minute: Option<u64>,
    chars_per_word: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawViewsSettings {
    capacity: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    title: Option<String>,
    description: Option<String>,
    author: Option<String>,
    datastar_script: Option<String>,
    navigation: Option<Vec<NavigationLink>>,
    assets_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawPortfolioSettings {
    headline: Option<String>,
    intro: Option<String>,
    sections: Vec<PortfolioSection>,
    skills: Vec<RawSkill>,
    resume_url: Option<String>,
    contact_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSkill {
    name: String,
    level: i64,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
