//! Tor control protocol client
//!
//! Speaks just enough of the line-based control protocol to authenticate and
//! ask Tor for a fresh circuit. The connection is opened per request and is
//! owned by `new_identity`, so it is closed on every return path.

use std::io::ErrorKind;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::config::TorConfig;
use crate::error::{Result, ScrapeGateError};

const SUCCESS_MARKER: &str = "250 OK";

/// Handshake progress, reported in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlStage {
    Connecting,
    Authenticating,
    SignalSent,
    Closing,
    /// Exit IP check after the new circuit settles
    Verifying,
}

/// Client for the Tor control port
#[derive(Debug, Clone)]
pub struct TorControlClient {
    host: String,
    port: u16,
    password: String,
    timeout: Duration,
}

impl TorControlClient {
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
            timeout,
        }
    }

    pub fn from_config(config: &TorConfig) -> Self {
        Self::new(
            config.host.clone(),
            config.control_port,
            config.control_password.clone(),
            config.control_timeout,
        )
    }

    /// host:port of the control endpoint
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Authenticate and send `SIGNAL NEWNYM`
    #[instrument(skip(self), fields(addr = %self.addr()))]
    pub async fn new_identity(&self) -> Result<()> {
        let addr = self.addr();
        info!("Requesting new Tor identity via control port");

        debug!(stage = ?ControlStage::Connecting);
        let mut stream = self.connect(&addr).await?;

        debug!(stage = ?ControlStage::Authenticating);
        let auth = format!("AUTHENTICATE \"{}\"", quote_password(&self.password));
        let response = self.command(&mut stream, &addr, &auth, 1024).await?;
        if !response.contains(SUCCESS_MARKER) {
            warn!(response = %response.trim(), "Tor control authentication failed");
            return Err(ScrapeGateError::ControlAuthFailed(response.trim().to_string()));
        }

        let response = self
            .command(&mut stream, &addr, "SIGNAL NEWNYM", 1024)
            .await?;
        if !response.contains(SUCCESS_MARKER) {
            warn!(response = %response.trim(), "Tor NEWNYM signal failed");
            return Err(ScrapeGateError::CircuitRotationFailed(
                response.trim().to_string(),
            ));
        }
        debug!(stage = ?ControlStage::SignalSent);

        debug!(stage = ?ControlStage::Closing);
        if let Err(e) = self
            .command(&mut stream, &addr, "GETINFO circuit-status", 4096)
            .await
        {
            debug!("Ignoring circuit-status failure: {}", e);
        }
        let _ = timeout(self.timeout, stream.write_all(b"QUIT\r\n")).await;
        let _ = timeout(self.timeout, stream.shutdown()).await;

        info!("New Tor identity requested successfully");
        Ok(())
    }

    async fn connect(&self, addr: &str) -> Result<TcpStream> {
        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(stream),
            Ok(Err(e)) if e.kind() == ErrorKind::ConnectionRefused => {
                warn!("Connection refused to Tor control port");
                Err(ScrapeGateError::ControlUnreachable {
                    addr: addr.to_string(),
                })
            }
            Ok(Err(e)) if e.kind() == ErrorKind::TimedOut => {
                Err(ScrapeGateError::ControlTimeout {
                    addr: addr.to_string(),
                })
            }
            Ok(Err(e)) => Err(ScrapeGateError::ControlError(e.to_string())),
            Err(_) => {
                warn!("Connection timeout to Tor control port");
                Err(ScrapeGateError::ControlTimeout {
                    addr: addr.to_string(),
                })
            }
        }
    }

    /// Send one command line and read a single reply chunk
    async fn command(
        &self,
        stream: &mut TcpStream,
        addr: &str,
        line: &str,
        max_reply: usize,
    ) -> Result<String> {
        let request = format!("{}\r\n", line);
        self.bounded(addr, stream.write_all(request.as_bytes()))
            .await?;

        let mut reply = vec![0u8; max_reply];
        let n = self.bounded(addr, stream.read(&mut reply)).await?;
        if n == 0 {
            return Err(ScrapeGateError::ControlError(
                "control connection closed by Tor".to_string(),
            ));
        }

        Ok(String::from_utf8_lossy(&reply[..n]).into_owned())
    }

    async fn bounded<T>(
        &self,
        addr: &str,
        op: impl std::future::Future<Output = std::io::Result<T>>,
    ) -> Result<T> {
        match timeout(self.timeout, op).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ScrapeGateError::ControlError(e.to_string())),
            Err(_) => Err(ScrapeGateError::ControlTimeout {
                addr: addr.to_string(),
            }),
        }
    }
}

/// Escape a password for a control-protocol QuotedString
fn quote_password(password: &str) -> String {
    password.replace('\\', "\\\\").replace('"', "\\\"")
}
