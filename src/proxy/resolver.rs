//! Proxy configuration resolution for the free and paid paths

use std::sync::Arc;

use tracing::debug;

use super::provider::{ProviderKind, ProviderParams, ProviderRegistry};
use super::session::SessionIdentity;
use super::url_builder::{assemble_url, build_credentials};
use crate::error::{Result, ScrapeGateError};
use crate::models::{BrowserProxy, ProxyConfig};

/// Turns the registry and the current session token into a ready proxy URL
#[derive(Debug, Clone)]
pub struct ProxyConfigResolver {
    registry: Arc<ProviderRegistry>,
    session: Arc<SessionIdentity>,
}

impl ProxyConfigResolver {
    pub fn new(registry: Arc<ProviderRegistry>, session: Arc<SessionIdentity>) -> Self {
        Self { registry, session }
    }

    /// Resolve the proxy for the free (Tor) or paid (vendor) path
    pub fn resolve(&self, free: bool) -> Result<ProxyConfig> {
        if free {
            Ok(self.resolve_network())
        } else {
            self.resolve_paid()
        }
    }

    /// Resolve and wrap for the browser engine
    pub fn browser_proxy(&self, free: bool) -> Result<BrowserProxy> {
        Ok(self.resolve(free)?.browser_proxy())
    }

    pub fn session(&self) -> &Arc<SessionIdentity> {
        &self.session
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    fn resolve_network(&self) -> ProxyConfig {
        let endpoint = self.registry.network();
        let url = format!("socks5://{}:{}", endpoint.host, endpoint.port);
        ProxyConfig::new(url, ProviderKind::Network.as_str(), "")
    }

    fn resolve_paid(&self) -> Result<ProxyConfig> {
        let kind = self.registry.selected()?;

        let ProviderParams::Vendor(vendor) = self.registry.params(kind) else {
            return Err(ScrapeGateError::UnsupportedProvider(format!(
                "{} cannot be selected as a paid provider",
                kind
            )));
        };

        if !vendor.has_credentials() {
            return Err(ScrapeGateError::ProviderNotConfigured {
                provider: kind.as_str().to_string(),
                env_prefix: kind.env_prefix().to_string(),
            });
        }

        let session_id = self.session.read();
        let credentials = build_credentials(kind, &session_id, ProviderParams::Vendor(vendor))?;

        debug!(provider = %kind, host = %credentials.host, "Resolved paid proxy");

        Ok(ProxyConfig::new(
            assemble_url(&credentials),
            kind.as_str(),
            session_id,
        ))
    }
}
