use serde::{Deserialize, Serialize};

/// Default navigation budget in milliseconds
pub const DEFAULT_SCRAPE_TIMEOUT_MS: u64 = 30_000;

/// Query parameters of `GET /scrape`
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeQuery {
    /// Target URL, `https://` is assumed when no scheme is given
    pub url: Option<String>,
    /// CSS selector to wait for before capturing the page
    pub wait_for_selector: Option<String>,
    /// Max wait time in milliseconds
    pub timeout: Option<u64>,
    /// Return a base64 PNG screenshot
    #[serde(default)]
    pub screenshot: bool,
    /// Use the Tor proxy instead of the paid vendor
    #[serde(default)]
    pub is_free: bool,
}

impl ScrapeQuery {
    pub fn timeout_ms(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_SCRAPE_TIMEOUT_MS)
    }
}

/// Page metadata pulled from `<meta>` and `<link>` tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeMetadata {
    pub description: Option<String>,
    pub keywords: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub author: Option<String>,
    pub canonical: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeTiming {
    pub total_ms: u64,
}

/// Response body of `GET /scrape`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResponse {
    /// Final URL after redirects
    pub url: String,
    pub title: String,
    pub html: String,
    pub text_content: String,
    pub main_content: Option<String>,
    pub metadata: ScrapeMetadata,
    /// Base64 PNG, only when requested
    pub screenshot: Option<String>,
    pub timing: ScrapeTiming,
}
