//! YouTube transcript handlers

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tracing::{info, warn};

use crate::api::server::AppState;
use crate::error::{Result, ScrapeGateError};
use crate::models::{ProxyConfig, TranscriptListQuery, TranscriptQuery};
use crate::services::TranscriptError;

/// Fetch the transcript of a video in one language
pub async fn get_transcript(
    State(state): State<AppState>,
    Query(query): Query<TranscriptQuery>,
) -> std::result::Result<impl IntoResponse, ScrapeGateError> {
    let proxy = transcript_proxy(&state)?;
    info!(video_id = %query.video_id, language = %query.language, tor = proxy.is_some(), "Fetching transcript");

    let transcript = state
        .transcripts
        .fetch(&query.video_id, &[query.language.clone()], proxy.as_ref())
        .await
        .map_err(transcript_error)?;

    Ok((StatusCode::OK, Json(json!({ "transcript": transcript }))))
}

/// List the caption tracks of a video
pub async fn list_transcripts(
    State(state): State<AppState>,
    Query(query): Query<TranscriptListQuery>,
) -> std::result::Result<impl IntoResponse, ScrapeGateError> {
    let proxy = transcript_proxy(&state)?;
    info!(video_id = %query.video_id, tor = proxy.is_some(), "Listing transcripts");

    let available = state
        .transcripts
        .list(&query.video_id, proxy.as_ref())
        .await
        .map_err(transcript_error)?;

    Ok((
        StatusCode::OK,
        Json(json!({ "available_transcripts": available })),
    ))
}

/// Transcript traffic goes through Tor whenever it is enabled
fn transcript_proxy(state: &AppState) -> Result<Option<ProxyConfig>> {
    if state.config.tor.enabled {
        state.resolver.resolve(true).map(Some)
    } else {
        Ok(None)
    }
}

fn transcript_error(err: TranscriptError) -> ScrapeGateError {
    warn!("Transcript request failed: {}", err);
    match err {
        TranscriptError::Blocked(_) => ScrapeGateError::IpBlocked,
        TranscriptError::Connection(message) => ScrapeGateError::UpstreamConnection(message),
        TranscriptError::NotFound(message) | TranscriptError::Unexpected(message) => {
            ScrapeGateError::TranscriptNotFound(message)
        }
    }
}
