//! Identity rotation for the free and paid paths
//!
//! The paid path swaps the in-process session token, which changes the
//! username every vendor sees and so asks for a new exit IP. The free path has
//! no token; it asks Tor itself for a new circuit over the control port.
//! Both paths finish with an advisory exit IP check whose failure never fails
//! the rotation.

mod control;

pub use control::{ControlStage, TorControlClient};

use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use super::ip_check::IpChecker;
use super::resolver::ProxyConfigResolver;
use crate::error::Result;
use crate::models::{FreeRotation, PaidRotation, RotationOutcome};

/// Drives identity rotation on either path
#[derive(Debug, Clone)]
pub struct IdentityRotationController {
    resolver: ProxyConfigResolver,
    control: TorControlClient,
    ip_checker: IpChecker,
    settle_delay: Duration,
}

impl IdentityRotationController {
    pub fn new(
        resolver: ProxyConfigResolver,
        control: TorControlClient,
        ip_checker: IpChecker,
        settle_delay: Duration,
    ) -> Self {
        Self {
            resolver,
            control,
            ip_checker,
            settle_delay,
        }
    }

    /// Rotate the identity of the selected path
    pub async fn rotate(&self, free: bool) -> Result<RotationOutcome> {
        if free {
            Ok(RotationOutcome::Free(self.rotate_free().await?))
        } else {
            Ok(RotationOutcome::Paid(self.rotate_paid().await))
        }
    }

    /// Swap the session token and report the new exit IP if it can be seen
    #[instrument(skip(self))]
    pub async fn rotate_paid(&self) -> PaidRotation {
        let (previous, current) = self.resolver.session().replace();
        info!(session_id = %current, "Rotated paid proxy session");

        let provider = self.resolver.registry().selected_raw().to_lowercase();

        let exit_ip = match self.resolver.resolve(false) {
            Ok(config) => self.verify(&config.http_url).await,
            Err(e) => {
                warn!("Skipping exit IP check after session rotation: {}", e);
                None
            }
        };

        PaidRotation {
            provider,
            previous_session_id: previous,
            session_id: current,
            exit_ip,
        }
    }

    /// Ask Tor for a new circuit and report the new exit IP if it can be seen
    #[instrument(skip(self))]
    pub async fn rotate_free(&self) -> Result<FreeRotation> {
        self.control.new_identity().await?;

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        debug!(stage = ?ControlStage::Verifying);
        let config = self.resolver.resolve(true)?;
        let new_exit_ip = self.verify(&config.http_url).await;

        Ok(FreeRotation { new_exit_ip })
    }

    /// Control endpoint the free path talks to
    pub fn control_addr(&self) -> String {
        self.control.addr()
    }

    async fn verify(&self, proxy_url: &str) -> Option<String> {
        match self.ip_checker.fetch_origin(Some(proxy_url)).await {
            Ok(ip) => {
                info!(exit_ip = %ip, "Verified exit IP");
                Some(ip)
            }
            Err(e) => {
                warn!("Could not verify new exit IP: {}", e);
                None
            }
        }
    }
}
