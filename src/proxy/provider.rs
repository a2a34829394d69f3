//! Proxy provider registry
//!
//! The six providers form a closed set: the free Tor network and five paid
//! residential vendors. Connection parameters are loaded once from
//! configuration and never change afterwards.

use std::str::FromStr;

use serde::Serialize;

use crate::config::{ProvidersConfig, TorConfig, VendorConfig};
use crate::error::{Result, ScrapeGateError};

/// Proxy provider identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Tor anonymizing network (free path)
    Network,
    BrightData,
    Oxylabs,
    SmartProxy,
    IpRoyal,
    FloppyData,
}

impl ProviderKind {
    /// All paid vendors, in declaration order
    #[cfg(test)]
    pub const VENDORS: [ProviderKind; 5] = [
        ProviderKind::BrightData,
        ProviderKind::Oxylabs,
        ProviderKind::SmartProxy,
        ProviderKind::IpRoyal,
        ProviderKind::FloppyData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Network => "network",
            ProviderKind::BrightData => "brightdata",
            ProviderKind::Oxylabs => "oxylabs",
            ProviderKind::SmartProxy => "smartproxy",
            ProviderKind::IpRoyal => "iproyal",
            ProviderKind::FloppyData => "floppydata",
        }
    }

    /// Prefix of the environment variables holding this provider's settings
    pub fn env_prefix(&self) -> &'static str {
        match self {
            ProviderKind::Network => "TOR_PROXY",
            ProviderKind::BrightData => "BRIGHTDATA",
            ProviderKind::Oxylabs => "OXYLABS",
            ProviderKind::SmartProxy => "SMARTPROXY",
            ProviderKind::IpRoyal => "IPROYAL",
            ProviderKind::FloppyData => "FLOPPYDATA",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ScrapeGateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "network" | "tor" => Ok(ProviderKind::Network),
            "brightdata" => Ok(ProviderKind::BrightData),
            "oxylabs" => Ok(ProviderKind::Oxylabs),
            "smartproxy" => Ok(ProviderKind::SmartProxy),
            "iproyal" => Ok(ProviderKind::IpRoyal),
            "floppydata" => Ok(ProviderKind::FloppyData),
            _ => Err(ScrapeGateError::UnknownProvider(s.to_string())),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tor SOCKS endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkEndpoint {
    pub host: String,
    pub port: u16,
}

/// Connection parameters of a paid vendor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VendorParams {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub country: Option<String>,
    pub city: Option<String>,
    pub rotation: Option<String>,
}

impl VendorParams {
    /// Both username and password are present
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    fn from_config(vendor: &VendorConfig) -> Self {
        Self {
            host: vendor.host.clone(),
            port: vendor.port,
            username: vendor.username.clone(),
            password: vendor.password.clone(),
            ..Default::default()
        }
    }
}

/// Parameters returned by a registry lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderParams<'a> {
    Network(&'a NetworkEndpoint),
    Vendor(&'a VendorParams),
}

/// Static table of proxy providers
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    network: NetworkEndpoint,
    brightdata: VendorParams,
    oxylabs: VendorParams,
    smartproxy: VendorParams,
    iproyal: VendorParams,
    floppydata: VendorParams,
    /// Raw default vendor selection, parsed on use
    selected: String,
}

impl ProviderRegistry {
    /// Build the registry from loaded configuration
    pub fn from_config(tor: &TorConfig, providers: &ProvidersConfig) -> Self {
        let mut floppydata = VendorParams::from_config(&providers.floppydata);
        floppydata.country = Some(providers.floppydata_country.clone());
        floppydata.city = Some(providers.floppydata_city.clone()).filter(|c| !c.is_empty());
        floppydata.rotation = Some(providers.floppydata_rotation.clone());

        Self {
            network: NetworkEndpoint {
                host: tor.host.clone(),
                port: tor.port,
            },
            brightdata: VendorParams::from_config(&providers.brightdata),
            oxylabs: VendorParams::from_config(&providers.oxylabs),
            smartproxy: VendorParams::from_config(&providers.smartproxy),
            iproyal: VendorParams::from_config(&providers.iproyal),
            floppydata,
            selected: providers.selected.clone(),
        }
    }

    /// Build a registry with only the Tor endpoint and a selection set
    pub fn new(network: NetworkEndpoint, selected: impl Into<String>) -> Self {
        Self {
            network,
            brightdata: VendorParams::default(),
            oxylabs: VendorParams::default(),
            smartproxy: VendorParams::default(),
            iproyal: VendorParams::default(),
            floppydata: VendorParams::default(),
            selected: selected.into(),
        }
    }

    /// Replace the parameters of one vendor
    pub fn with_vendor(mut self, kind: ProviderKind, params: VendorParams) -> Self {
        match kind {
            ProviderKind::Network => {}
            ProviderKind::BrightData => self.brightdata = params,
            ProviderKind::Oxylabs => self.oxylabs = params,
            ProviderKind::SmartProxy => self.smartproxy = params,
            ProviderKind::IpRoyal => self.iproyal = params,
            ProviderKind::FloppyData => self.floppydata = params,
        }
        self
    }

    /// Look up a provider by identifier
    pub fn lookup(&self, id: &str) -> Result<ProviderParams<'_>> {
        let kind: ProviderKind = id.parse()?;
        Ok(self.params(kind))
    }

    /// Connection parameters of a known provider
    pub fn params(&self, kind: ProviderKind) -> ProviderParams<'_> {
        match kind {
            ProviderKind::Network => ProviderParams::Network(&self.network),
            ProviderKind::BrightData => ProviderParams::Vendor(&self.brightdata),
            ProviderKind::Oxylabs => ProviderParams::Vendor(&self.oxylabs),
            ProviderKind::SmartProxy => ProviderParams::Vendor(&self.smartproxy),
            ProviderKind::IpRoyal => ProviderParams::Vendor(&self.iproyal),
            ProviderKind::FloppyData => ProviderParams::Vendor(&self.floppydata),
        }
    }

    pub fn network(&self) -> &NetworkEndpoint {
        &self.network
    }

    /// The configured default vendor
    pub fn selected(&self) -> Result<ProviderKind> {
        self.selected.parse()
    }

    /// The configured default vendor identifier as written
    pub fn selected_raw(&self) -> &str {
        &self.selected
    }
}
