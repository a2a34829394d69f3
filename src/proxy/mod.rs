//! Proxy identity management
//!
//! This module provides:
//! - The provider registry (Tor plus paid residential vendors)
//! - Per-vendor username grammar and URL assembly
//! - The rotating session identity used for IP pinning
//! - Proxy resolution for the free and paid paths
//! - Identity rotation, including the Tor control handshake

pub mod ip_check;
pub mod provider;
pub mod resolver;
pub mod rotation;
pub mod session;
pub mod url_builder;

pub use ip_check::IpChecker;
pub use provider::{NetworkEndpoint, ProviderKind, ProviderParams, ProviderRegistry, VendorParams};
pub use resolver::ProxyConfigResolver;
pub use rotation::{IdentityRotationController, TorControlClient};
pub use session::SessionIdentity;
