// Main entry point - Dependency injection and server setup
use std::sync::Arc;

use finstream::application::api_probe::ApiProbeService;
use finstream::application::sync_controller::{SyncController, SyncOptions};
use finstream::application::telemetry_repository::TelemetryRepository;
use finstream::domain::query::{PageRequest, TrackingQuery};
use finstream::infrastructure::api_repository::RestTelemetryRepository;
use finstream::infrastructure::config::{SyncSettings, TrackedResource, load_settings};
use finstream::infrastructure::endpoints::UrlBuilder;
use finstream::infrastructure::http_transport::HttpTransport;
use finstream::presentation::app_state::AppState;
use finstream::presentation::router;

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,finstream=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}

fn tracking_query(sync: &SyncSettings) -> TrackingQuery {
    match sync.resource {
        TrackedResource::LatestPositions => TrackingQuery::LatestPositions,
        TrackedResource::Page => {
            TrackingQuery::Page(PageRequest::new(sync.page_num, sync.items_per_page))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    // Load configuration
    let settings = load_settings()?;
    tracing::info!(
        deployment = %settings.deployment,
        base_url = %settings.api.base_url,
        timeout_ms = settings.api.timeout_ms,
        "configuration loaded"
    );

    // Infrastructure layer
    let urls = UrlBuilder::new(&settings.api.base_url);
    let transport = HttpTransport::new(urls, settings.api.timeout());
    let repository = Arc::new(RestTelemetryRepository::new(transport.clone()));

    // Application layer
    let probe = ApiProbeService::new(transport);
    let report = probe.run_all().await;
    for result in report.results.iter().filter(|r| !r.is_healthy) {
        tracing::warn!(
            probe = result.name,
            endpoint = %result.endpoint,
            error = result.error.as_deref().unwrap_or(""),
            "tracking API endpoint unavailable at startup"
        );
    }

    match repository.service_info().await {
        Ok(info) => tracing::info!(info = %info, "tracking API info"),
        Err(err) => tracing::warn!(error = %err, "tracking API info unavailable"),
    }

    let controller = SyncController::mount(
        repository,
        tracking_query(&settings.sync),
        SyncOptions {
            poll_interval: settings.sync.poll_interval(),
        },
    );

    let state = Arc::new(AppState { controller, probe });

    // Presentation layer
    let listener = tokio::net::TcpListener::bind(&settings.server.bind).await?;
    tracing::info!(bind = %settings.server.bind, "finstream listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
