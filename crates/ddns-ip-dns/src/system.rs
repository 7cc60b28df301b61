//! Recorded-address source backed by the system resolver

use async_trait::async_trait;
use ddns_core::traits::IpSource;
use ddns_core::{Error, ResolutionError, Result};
use std::net::IpAddr;

/// Resolves a hostname via standard name resolution
#[derive(Debug, Clone)]
pub struct SystemResolverSource {
    host: String,
}

impl SystemResolverSource {
    /// Create a source for `host` (e.g. "example.com")
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl IpSource for SystemResolverSource {
    async fn current(&self) -> Result<IpAddr> {
        let mut addrs = tokio::net::lookup_host((self.host.as_str(), 0))
            .await
            .map_err(|e| ResolutionError::Lookup {
                host: self.host.clone(),
                reason: e.to_string(),
            })?;

        // Resolver order is preserved; the first entry wins
        let ip = addrs.next().map(|addr| addr.ip()).ok_or_else(|| {
            Error::from(ResolutionError::NoAddresses {
                host: self.host.clone(),
            })
        })?;

        tracing::debug!(host = %self.host, %ip, "resolved recorded address");
        Ok(ip)
    }

    fn describe(&self) -> String {
        format!("system resolver ({})", self.host)
    }
}
