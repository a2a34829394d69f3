use serde::{Deserialize, Serialize};

/// Resolved proxy configuration for one outbound call
///
/// Built fresh on every resolution. `http_url` and `https_url` always carry the
/// same endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub http_url: String,
    pub https_url: String,
    pub provider: String,
    /// Session token embedded in the URL, empty on the free path
    #[serde(default)]
    pub session_id: String,
}

impl ProxyConfig {
    pub fn new(url: impl Into<String>, provider: impl Into<String>, session_id: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            https_url: url.clone(),
            http_url: url,
            provider: provider.into(),
            session_id: session_id.into(),
        }
    }

    /// Browser launch value for this configuration
    pub fn browser_proxy(&self) -> BrowserProxy {
        BrowserProxy {
            server: self.http_url.clone(),
        }
    }
}

/// Proxy value handed to the browser engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserProxy {
    pub server: String,
}

/// Query string shared by endpoints that pick the free or paid path
#[derive(Debug, Clone, Copy, Deserialize, Default)]
pub struct ProxyPathQuery {
    #[serde(rename = "isFree", default)]
    pub is_free: bool,
}

/// Result of rotating the paid session identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaidRotation {
    pub provider: String,
    pub previous_session_id: String,
    pub session_id: String,
    /// Exit IP seen through the new session, when verification succeeded
    pub exit_ip: Option<String>,
}

/// Result of requesting a new Tor circuit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreeRotation {
    pub new_exit_ip: Option<String>,
}

/// Outcome of a rotation on either path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "path", rename_all = "lowercase")]
pub enum RotationOutcome {
    Paid(PaidRotation),
    Free(FreeRotation),
}
