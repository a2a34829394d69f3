//! Exit IP verification through a given proxy

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::config::IpCheckConfig;
use crate::error::Result;

#[derive(Debug, Deserialize)]
struct IpCheckResponse {
    origin: String,
}

/// Fetches the caller's visible IP from an httpbin-style endpoint
#[derive(Debug, Clone)]
pub struct IpChecker {
    url: String,
    timeout: Duration,
}

impl IpChecker {
    pub fn new(config: &IpCheckConfig) -> Self {
        Self {
            url: config.url.clone(),
            timeout: config.timeout,
        }
    }

    /// Return the `origin` field as seen through `proxy_url`, or directly when `None`
    ///
    /// Every call builds its own client, so the proxy never leaks into other requests.
    #[instrument(skip(self, proxy_url), fields(url = %self.url, proxied = proxy_url.is_some()))]
    pub async fn fetch_origin(&self, proxy_url: Option<&str>) -> Result<String> {
        let mut builder = reqwest::Client::builder().timeout(self.timeout);
        builder = match proxy_url {
            Some(url) => builder.proxy(reqwest::Proxy::all(url)?),
            None => builder.no_proxy(),
        };
        let client = builder.build()?;

        let response: IpCheckResponse = client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(origin = %response.origin, "IP check complete");
        Ok(response.origin)
    }
}
