// crates/bridge-client/src/config.rs
// ============================================================================
// Module: Bridge Client Configuration
// Description: Host, timeout, and client identity for API clients.
// Dependencies: bridge-core, url
// ============================================================================

use std::time::Duration;

use bridge_core::ClientInfo;
use url::Url;

use crate::error::ApiError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for a [`crate::BridgeClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service root, for example `https://webservices.sagebridge.org`.
    pub host_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Client identity sent as the user agent.
    pub client_info: ClientInfo,
}

impl ClientConfig {
    /// Creates a configuration for a service root.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] when the URL is not an absolute
    /// `http` or `https` URL.
    pub fn new(host_url: &str) -> Result<Self, ApiError> {
        let host_url = Url::parse(host_url)
            .map_err(|err| ApiError::InvalidRequest(format!("invalid host url {host_url}: {err}")))?;
        match host_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ApiError::InvalidRequest(format!("unsupported host url scheme {scheme}")));
            }
        }
        Ok(Self {
            host_url,
            timeout: DEFAULT_TIMEOUT,
            client_info: default_client_info(),
        })
    }

    /// Replaces the timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces the client identity.
    #[must_use]
    pub fn with_client_info(mut self, client_info: ClientInfo) -> Self {
        self.client_info = client_info;
        self
    }
}

/// Identity used when callers do not supply one.
#[must_use]
pub fn default_client_info() -> ClientInfo {
    ClientInfo::default()
        .with_app("Bridge System Tests", 1)
        .with_device("Integration Tests")
        .with_sdk("bridge-client", 1)
}
