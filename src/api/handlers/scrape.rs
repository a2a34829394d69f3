//! Headless-browser scraping handler

use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{info, warn};

use crate::api::server::AppState;
use crate::error::ScrapeGateError;
use crate::models::{ScrapeQuery, ScrapeResponse, ScrapeTiming};
use crate::services::{extract_main_content, extract_metadata, RenderError, RenderRequest};

/// Engine error fragments that point at the proxy rather than the target
const PROXY_FAILURE_MARKERS: [&str; 3] = ["err_proxy_connection_failed", "socks", "proxy"];

/// Render a page through the resolved proxy and extract its content
pub async fn scrape(
    State(state): State<AppState>,
    Query(query): Query<ScrapeQuery>,
) -> Result<impl IntoResponse, ScrapeGateError> {
    let started = Instant::now();

    let url = normalize_target(query.url.as_deref())?;
    let proxy = state.resolver.resolve(query.is_free)?;
    let timeout_ms = query.timeout_ms();

    info!(url = %url, provider = %proxy.provider, timeout_ms, "Scraping page");

    let request = RenderRequest {
        url,
        proxy: proxy.browser_proxy(),
        wait_for_selector: query
            .wait_for_selector
            .clone()
            .filter(|s| !s.trim().is_empty()),
        timeout: Duration::from_millis(timeout_ms),
        screenshot: query.screenshot,
    };

    let page = state
        .renderer
        .render(request)
        .await
        .map_err(|e| classify_render_error(e, timeout_ms, &proxy.provider))?;

    let metadata = extract_metadata(&page.html);
    let main_content = extract_main_content(&page.html);
    let screenshot = page.screenshot.map(|png| STANDARD.encode(png));

    Ok((
        StatusCode::OK,
        Json(ScrapeResponse {
            url: page.final_url,
            title: page.title,
            html: page.html,
            text_content: page.text_content,
            main_content,
            metadata,
            screenshot,
            timing: ScrapeTiming {
                total_ms: started.elapsed().as_millis() as u64,
            },
        }),
    ))
}

/// Require a non-empty URL and default the scheme to https
fn normalize_target(url: Option<&str>) -> Result<String, ScrapeGateError> {
    let url = url.map(str::trim).unwrap_or_default();
    if url.is_empty() {
        return Err(ScrapeGateError::InvalidRequest("URL is required".to_string()));
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Ok(format!("https://{}", url))
    }
}

fn classify_render_error(err: RenderError, timeout_ms: u64, provider: &str) -> ScrapeGateError {
    match err {
        RenderError::Timeout(_) => {
            warn!(timeout_ms, "Page load timed out");
            ScrapeGateError::PageLoadTimeout { timeout_ms }
        }
        RenderError::Engine(message) => {
            let lowered = message.to_lowercase();
            if PROXY_FAILURE_MARKERS.iter().any(|m| lowered.contains(m)) {
                warn!(provider, "Proxy connection failed: {}", message);
                ScrapeGateError::ProxyConnectionFailed {
                    provider: provider.to_string(),
                }
            } else {
                warn!("Scraping failed: {}", message);
                ScrapeGateError::Scrape(message)
            }
        }
    }
}
