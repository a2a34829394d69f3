//! API server using Axum
//!
//! Serves the proxy, Tor, scraping, statistics and transcript endpoints.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::Request;
use axum::{middleware, Router, ServiceExt};
use tokio::sync::watch;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::config::Config;
use crate::database::ColumnStore;
use crate::error::{Result, ScrapeGateError};
use crate::proxy::{IdentityRotationController, IpChecker, ProxyConfigResolver};
use crate::services::{PageRenderer, TranscriptFetcher};

use super::middleware::RequestLogging;
use super::routes;

/// Shared state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub resolver: ProxyConfigResolver,
    pub rotation: Arc<IdentityRotationController>,
    pub ip_checker: IpChecker,
    pub renderer: Arc<dyn PageRenderer>,
    pub transcripts: Arc<dyn TranscriptFetcher>,
    pub column_store: Arc<dyn ColumnStore>,
}

/// API server
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router
    pub fn build_router(&self) -> Router {
        routes::create_router(self.state.clone())
            .layer(middleware::from_fn(RequestLogging::log_request))
            .layer(TraceLayer::new_for_http())
    }

    /// Router wrapped so trailing slashes are trimmed before routing
    pub fn app(&self) -> NormalizePath<Router> {
        NormalizePathLayer::trim_trailing_slash().layer(self.build_router())
    }

    /// Run the API server
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let addr: SocketAddr = self.state.config.api_addr().parse().map_err(|_| {
            ScrapeGateError::InvalidConfig(format!(
                "Invalid API server address: {}",
                self.state.config.api_addr()
            ))
        })?;

        let app = self.app();

        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            })
            .await
            .map_err(|e| ScrapeGateError::Internal(e.to_string()))?;

        info!("API server shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    fn stat_item() -> serde_json::Value {
        json!({
            "language": 1,
            "translationLanguage": 2,
            "wordId": 3,
            "externalId": 4,
            "interval": 5,
            "repetitions": 6,
            "lastRes": 7,
            "timestampAdded": 8,
            "timestampUpdated": 9,
            "nextStartTS": 10,
            "type": 0
        })
    }

    #[tokio::test]
    async fn test_trailing_slash_routes_resolve() {
        let harness = Harness::new(
            test_config().await,
            RenderBehavior::Page(sample_page()),
            TranscriptBehavior::Found,
        );

        let (status, body) = harness.call_app(get("/health/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = harness
            .call_app(post_json(
                "/stats/",
                json!({"table": "word_stats", "data": [stat_item()]}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "success"}));
        assert_eq!(harness.store.inserts.lock().unwrap().len(), 1);

        let (status, body) = harness.call_app(get("/proxy/config/?isFree=true")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["provider"], "network");
    }

    #[tokio::test]
    async fn test_router_without_normalization_rejects_trailing_slash() {
        let harness = Harness::new(
            test_config().await,
            RenderBehavior::Page(sample_page()),
            TranscriptBehavior::Found,
        );

        let (status, _) = harness.call(get("/health/")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
