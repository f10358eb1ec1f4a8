use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use belgiantrain::app::AppContext;
use belgiantrain::cache::CachedIrailClient;
use belgiantrain::config::Config;
use belgiantrain::irail::{IrailApi, IrailClient};
use belgiantrain::stations::StationDirectory;
use belgiantrain::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,belgiantrain=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env().expect("Failed to load config");
    tracing::info!(
        connections = config.connections.len(),
        liveboards = config.liveboards.len(),
        "Loaded configuration"
    );

    let client =
        IrailClient::new(config.irail.to_client_config()).expect("Failed to create iRail client");
    let api: Arc<dyn IrailApi> = if config.cache.enabled {
        Arc::new(CachedIrailClient::new(
            Arc::new(client),
            &config.cache.to_cache_config(),
        ))
    } else {
        Arc::new(client)
    };

    // Without stations nothing can be resolved; fail fast.
    tracing::info!("Fetching stations...");
    let stations = StationDirectory::fetch(Arc::clone(&api))
        .await
        .expect("Failed to fetch stations");
    tracing::info!(stations = stations.len().await, "Loaded stations");

    spawn_station_refresh(stations.clone(), config.station_refresh_interval());

    let app = Arc::new(AppContext::new(
        api,
        stations,
        config.update_interval(),
    ));
    let summary = app.setup_from_config(&config).await;
    tracing::info!(
        configured = summary.configured,
        failed = summary.failed,
        "Set up monitored entries"
    );

    let router = create_router(AppState::new(Arc::clone(&app)));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .expect("Failed to bind listener");
    tracing::info!("Listening on http://{}", config.bind);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    app.shutdown();
}

/// Refresh the station list in the background; a failure keeps the old one.
fn spawn_station_refresh(stations: StationDirectory, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            match stations.refresh().await {
                Ok(count) => tracing::info!(stations = count, "Refreshed stations"),
                Err(e) => tracing::warn!(error = %e, "Failed to refresh stations"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
