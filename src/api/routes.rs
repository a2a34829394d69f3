//! API route definitions

use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::server::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        // Proxy identity
        .route("/proxy/config", get(handlers::proxy::get_config))
        .route("/proxy/rotate", post(handlers::proxy::rotate))
        // Tor
        .route("/tor/new-identity", post(handlers::tor::new_identity))
        .route("/tor/test", get(handlers::tor::test_connection))
        // Scraping
        .route("/scrape", get(handlers::scrape::scrape))
        // Statistics
        .route("/stats", post(handlers::stats::create_stats))
        // Transcripts
        .route("/yt", get(handlers::transcript::get_transcript))
        .route("/yt-list", get(handlers::transcript::list_transcripts))
        .with_state(state)
}
