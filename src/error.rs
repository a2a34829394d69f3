use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Unified error type for the Scrapegate application
#[derive(Error, Debug)]
pub enum ScrapeGateError {
    // Provider errors
    #[error("Unknown proxy provider: {0}. Valid options: brightdata, oxylabs, smartproxy, iproyal, floppydata")]
    UnknownProvider(String),

    #[error("Unsupported proxy provider: {0}")]
    UnsupportedProvider(String),

    #[error("Proxy credentials not configured for {provider}. Set {env_prefix}_USERNAME and {env_prefix}_PASSWORD")]
    ProviderNotConfigured {
        provider: String,
        env_prefix: String,
    },

    // Tor control protocol errors
    #[error("Tor control port authentication failed: {0}")]
    ControlAuthFailed(String),

    #[error("Tor NEWNYM signal failed: {0}")]
    CircuitRotationFailed(String),

    #[error("Timeout connecting to Tor control port at {addr}")]
    ControlTimeout { addr: String },

    #[error("Cannot connect to Tor control port at {addr}. Ensure control port is enabled in torrc.")]
    ControlUnreachable { addr: String },

    #[error("Error requesting new Tor identity: {0}")]
    ControlError(String),

    #[error("Tor proxy is not enabled. Set USE_TOR_PROXY=true to use this endpoint.")]
    TorDisabled,

    // Request errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Scraping errors
    #[error("Page load timeout after {timeout_ms}ms. Try increasing timeout or check if the URL is accessible.")]
    PageLoadTimeout { timeout_ms: u64 },

    #[error("Proxy connection failed ({provider}). Check proxy configuration.")]
    ProxyConnectionFailed { provider: String },

    #[error("Scraping error: {0}")]
    Scrape(String),

    // Transcript errors
    #[error("{0}")]
    TranscriptNotFound(String),

    #[error("YouTube has blocked this IP. Try requesting a new Tor identity via POST /tor/new-identity")]
    IpBlocked,

    #[error("Connection error: {0}")]
    UpstreamConnection(String),

    // Column store errors
    #[error("Column store error: {0}")]
    ColumnStore(String),

    // HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Scrapegate operations
pub type Result<T> = std::result::Result<T, ScrapeGateError>;

impl ScrapeGateError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ScrapeGateError::InvalidRequest(_)
            | ScrapeGateError::InvalidConfig(_)
            | ScrapeGateError::TorDisabled => StatusCode::BAD_REQUEST,

            // 404 Not Found
            ScrapeGateError::TranscriptNotFound(_) => StatusCode::NOT_FOUND,

            // 429 Too Many Requests
            ScrapeGateError::IpBlocked => StatusCode::TOO_MANY_REQUESTS,

            // 503 Service Unavailable
            ScrapeGateError::ProviderNotConfigured { .. }
            | ScrapeGateError::ControlUnreachable { .. }
            | ScrapeGateError::ProxyConnectionFailed { .. }
            | ScrapeGateError::UpstreamConnection(_) => StatusCode::SERVICE_UNAVAILABLE,

            // 504 Gateway Timeout
            ScrapeGateError::ControlTimeout { .. } | ScrapeGateError::PageLoadTimeout { .. } => {
                StatusCode::GATEWAY_TIMEOUT
            }

            // 500 Internal Server Error
            ScrapeGateError::UnknownProvider(_)
            | ScrapeGateError::UnsupportedProvider(_)
            | ScrapeGateError::ControlAuthFailed(_)
            | ScrapeGateError::CircuitRotationFailed(_)
            | ScrapeGateError::ControlError(_)
            | ScrapeGateError::Scrape(_)
            | ScrapeGateError::ColumnStore(_)
            | ScrapeGateError::Http(_)
            | ScrapeGateError::Io(_)
            | ScrapeGateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for ScrapeGateError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_code_mapping() {
        assert_eq!(
            ScrapeGateError::InvalidRequest("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ScrapeGateError::TorDisabled.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ScrapeGateError::TranscriptNotFound("gone".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ScrapeGateError::IpBlocked.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ScrapeGateError::ProviderNotConfigured {
                provider: "oxylabs".to_string(),
                env_prefix: "OXYLABS".to_string(),
            }
            .status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ScrapeGateError::ControlUnreachable {
                addr: "tor-proxy:9051".to_string()
            }
            .status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ScrapeGateError::ControlTimeout {
                addr: "tor-proxy:9051".to_string()
            }
            .status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ScrapeGateError::PageLoadTimeout { timeout_ms: 100 }.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ScrapeGateError::ControlAuthFailed("515 Bad".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ScrapeGateError::UnknownProvider("nope".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_client_server_helpers() {
        assert!(ScrapeGateError::InvalidRequest("bad".to_string()).is_client_error());
        assert!(!ScrapeGateError::InvalidRequest("bad".to_string()).is_server_error());

        assert!(ScrapeGateError::IpBlocked.is_client_error());

        assert!(ScrapeGateError::ControlError("boom".to_string()).is_server_error());
        assert!(!ScrapeGateError::ControlError("boom".to_string()).is_client_error());
    }

    #[test]
    fn test_provider_not_configured_message_names_env_vars() {
        let err = ScrapeGateError::ProviderNotConfigured {
            provider: "iproyal".to_string(),
            env_prefix: "IPROYAL".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Proxy credentials not configured for iproyal. Set IPROYAL_USERNAME and IPROYAL_PASSWORD"
        );
    }
}
