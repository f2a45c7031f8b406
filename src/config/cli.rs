use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the folio binary.
#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Portfolio and blog server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "FOLIO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Serve the portfolio and blog pages.
    Serve(Box<ServeArgs>),
    /// Load the blog data once and report problems with it.
    Check(CheckArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ContentOverrides {
    /// Fetch the blog data document from this URL.
    #[arg(long = "content-url", value_name = "URL", conflicts_with = "content_path")]
    pub content_url: Option<String>,

    /// Read the blog data document from this file.
    #[arg(
        long = "content-path",
        value_name = "PATH",
        value_hint = ValueHint::FilePath
    )]
    pub content_path: Option<PathBuf>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub content: ContentOverrides,

    #[command(flatten)]
    pub logging: LoggingOverrides,

    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the number of posts per listing page.
    #[arg(long = "listing-page-size", value_name = "COUNT")]
    pub listing_page_size: Option<u32>,

    /// Override how many listing page views are kept for interactions.
    #[arg(long = "views-capacity", value_name = "COUNT")]
    pub views_capacity: Option<u32>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub content: ContentOverrides,

    #[command(flatten)]
    pub logging: LoggingOverrides,

    /// Exit with a failure status on warnings too.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub strict: bool,
}
