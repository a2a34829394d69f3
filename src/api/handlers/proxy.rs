//! Proxy identity handlers

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use crate::api::server::AppState;
use crate::error::ScrapeGateError;
use crate::models::ProxyPathQuery;

/// Resolve the proxy configuration for the free or paid path
pub async fn get_config(
    State(state): State<AppState>,
    Query(query): Query<ProxyPathQuery>,
) -> Result<impl IntoResponse, ScrapeGateError> {
    let config = state.resolver.resolve(query.is_free)?;
    Ok((StatusCode::OK, Json(config)))
}

/// Rotate the identity of the free or paid path
pub async fn rotate(
    State(state): State<AppState>,
    Query(query): Query<ProxyPathQuery>,
) -> Result<impl IntoResponse, ScrapeGateError> {
    if query.is_free && !state.config.tor.enabled {
        return Err(ScrapeGateError::TorDisabled);
    }

    info!(free = query.is_free, "Rotating proxy identity");
    let outcome = state.rotation.rotate(query.is_free).await?;
    Ok((StatusCode::OK, Json(outcome)))
}
