//! Tor circuit handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::api::server::AppState;
use crate::error::{Result, ScrapeGateError};

const NEW_IDENTITY_MESSAGE: &str =
    "New Tor identity requested. New circuit should be established within 1-2 seconds.";
const NEWNYM_NOTE: &str = "Tor rate-limits this request to approximately once per 10 seconds.";

#[derive(Debug, Serialize)]
pub struct NewIdentityResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub new_exit_ip: Option<String>,
    pub note: &'static str,
}

/// Force Tor onto a new circuit and exit IP
pub async fn new_identity(
    State(state): State<AppState>,
) -> std::result::Result<impl IntoResponse, ScrapeGateError> {
    if !state.config.tor.enabled {
        return Err(ScrapeGateError::TorDisabled);
    }

    info!(control = %state.rotation.control_addr(), "New identity requested");
    let rotation = state.rotation.rotate_free().await?;

    Ok((
        StatusCode::OK,
        Json(NewIdentityResponse {
            status: "success",
            message: NEW_IDENTITY_MESSAGE,
            new_exit_ip: rotation.new_exit_ip,
            note: NEWNYM_NOTE,
        }),
    ))
}

/// Compare the direct IP with the IP seen through Tor
///
/// Failures are reported in the body with a 200 status.
pub async fn test_connection(State(state): State<AppState>) -> impl IntoResponse {
    let tor_enabled = state.config.tor.enabled;

    match connection_report(&state).await {
        Ok(report) => (StatusCode::OK, Json(report)),
        Err(e) => {
            warn!("Tor connection test failed: {}", e);
            (
                StatusCode::OK,
                Json(json!({
                    "error": e.to_string(),
                    "tor_enabled": tor_enabled,
                })),
            )
        }
    }
}

async fn connection_report(state: &AppState) -> Result<Value> {
    let direct_ip = state.ip_checker.fetch_origin(None).await?;

    if !state.config.tor.enabled {
        return Ok(json!({
            "tor_enabled": false,
            "direct_ip": direct_ip,
        }));
    }

    let tor = state.resolver.resolve(true)?;
    let proxied_ip = state.ip_checker.fetch_origin(Some(&tor.http_url)).await?;

    Ok(json!({
        "tor_enabled": true,
        "tor_proxy": state.config.tor_proxy_addr(),
        "tor_working": direct_ip != proxied_ip,
        "direct_ip": direct_ip,
        "proxied_ip": proxied_ip,
    }))
}
