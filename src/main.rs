use std::{num::NonZeroUsize, process, sync::Arc};

use folio::{
    application::{
        check::{CheckReport, check_catalog},
        chrome::ChromeService,
        content::ContentStore,
        error::AppError,
    },
    cache::PageViews,
    config,
    infra::{
        assets::StaticAssets,
        content::source_from_settings,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tokio::sync::watch;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::from(InfraError::configuration(err.to_string())))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Check(args) => run_check(settings, args.strict).await,
    }
}

fn content_store(settings: &config::Settings) -> Result<ContentStore, AppError> {
    let source = source_from_settings(&settings.content)?;
    Ok(ContentStore::new(source))
}

fn build_http_state(settings: &config::Settings) -> Result<HttpState, AppError> {
    let store = content_store(settings)?;
    let capacity: NonZeroUsize = settings.views.capacity;

    Ok(HttpState {
        store,
        views: Arc::new(PageViews::new(capacity)),
        chrome: Arc::new(ChromeService::new(settings.site.clone())),
        options: settings.listing.options(settings.reading),
        portfolio: Arc::new(settings.portfolio.clone()),
        assets: Arc::new(StaticAssets::new(settings.site.assets_dir.clone())),
    })
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let state = build_http_state(&settings)?;
    info!(
        target = "folio::serve",
        addr = %settings.server.addr,
        content = %state.store.describe(),
        assets = %state.assets.root().display(),
        "Starting server"
    );

    serve_http(&settings, state).await
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    let (stopping_tx, mut stopping_rx) = watch::channel(false);
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown(
        async move {
            shutdown_signal().await;
            let _ = stopping_tx.send(true);
        },
    );

    let grace = settings.server.graceful_shutdown;
    let drain_deadline = async move {
        if stopping_rx.wait_for(|stopping| *stopping).await.is_ok() {
            tokio::time::sleep(grace).await;
        } else {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))?;
            info!(target = "folio::serve", "Server stopped");
        }
        _ = drain_deadline => {
            warn!(
                target = "folio::serve",
                grace_seconds = grace.as_secs(),
                "Graceful shutdown timed out; dropping open connections"
            );
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(target = "folio::serve", error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!(target = "folio::serve", "Shutdown requested; draining connections");
}

async fn run_check(settings: config::Settings, strict: bool) -> Result<(), AppError> {
    let store = content_store(&settings)?;
    info!(
        target = "folio::check",
        content = %store.describe(),
        strict,
        "Checking blog data"
    );

    let catalog = store.load().await?;
    let report = check_catalog(&catalog);
    print_report(&report);

    if report.passed(strict) {
        Ok(())
    } else {
        Err(AppError::Check(format!(
            "{} error(s), {} warning(s)",
            report.errors(),
            report.warnings()
        )))
    }
}

fn print_report(report: &CheckReport) {
    println!(
        "posts: {}  categories: {}",
        report.post_count, report.category_count
    );
    for finding in &report.findings {
        println!("{}: {}", finding.severity, finding.message);
    }
    println!(
        "{} error(s), {} warning(s)",
        report.errors(),
        report.warnings()
    );
}
