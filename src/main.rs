//! Scrapegate - Entry Point
//!
//! Wires the proxy identity subsystem and its collaborators into the API server
//! and runs it with graceful shutdown support.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scrapegate::api::{ApiServer, AppState};
use scrapegate::config::{Config, LogConfig};
use scrapegate::database::ClickHouseClient;
use scrapegate::proxy::{
    IdentityRotationController, IpChecker, ProviderRegistry, ProxyConfigResolver,
    SessionIdentity, TorControlClient,
};
use scrapegate::services::{ChromiumRenderer, YouTubeTranscripts};

#[tokio::main]
async fn main() -> scrapegate::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config.log);

    info!(
        service = %config.app.name,
        version = %config.app.version,
        environment = %config.app.environment,
        "Starting Scrapegate"
    );

    if config.tor.control_password_missing() {
        warn!("TOR_CONTROL_PASSWORD is empty; identity rotation fails unless the control port accepts null authentication");
    }

    // Proxy identity
    let registry = Arc::new(ProviderRegistry::from_config(&config.tor, &config.providers));
    let session = Arc::new(SessionIdentity::new());
    let resolver = ProxyConfigResolver::new(registry, session);
    let ip_checker = IpChecker::new(&config.ip_check);
    let rotation = IdentityRotationController::new(
        resolver.clone(),
        TorControlClient::from_config(&config.tor),
        ip_checker.clone(),
        config.tor.settle_delay,
    );
    info!(
        provider = %config.providers.selected,
        tor_enabled = config.tor.enabled,
        tor_proxy = %config.tor_proxy_addr(),
        "Proxy identity ready"
    );

    // Collaborators
    let clickhouse = ClickHouseClient::new(&config)?;
    if let Err(e) = clickhouse.health_check().await {
        warn!("ClickHouse is not reachable yet: {}", e);
    }
    let renderer = ChromiumRenderer::new(&config.scrape);
    let transcripts = YouTubeTranscripts::new(Duration::from_secs(30));

    let state = AppState {
        config: config.clone(),
        resolver,
        rotation: Arc::new(rotation),
        ip_checker,
        renderer: Arc::new(renderer),
        transcripts: Arc::new(transcripts),
        column_store: Arc::new(clickhouse),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let api_server = ApiServer::new(state);

    let api_task = tokio::spawn(async move {
        if let Err(e) = api_server.run(shutdown_rx).await {
            error!("API server error: {}", e);
        }
    });

    info!("Server started - API: {}", config.api_addr());

    // Wait for shutdown signal
    shutdown_signal().await;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    let _ = api_task.await;

    info!("Scrapegate stopped");
    Ok(())
}

/// `RUST_LOG` wins over `LOG_LEVEL`; `LOG_FORMAT=json` selects JSON lines
fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("scrapegate={},tower_http=debug", log.level).into());

    let (json, pretty) = if log.format.eq_ignore_ascii_case("json") {
        (Some(fmt::layer().json()), None)
    } else {
        (None, Some(fmt::layer().pretty()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
