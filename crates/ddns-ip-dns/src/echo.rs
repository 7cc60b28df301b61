//! Observed-address source: a single A query to an echo resolver
//!
//! ```text
//! query   myip.opendns.com. IN A  ──UDP──►  resolver1.opendns.com:53
//! answer  myip.opendns.com. IN A <our public address>
//! ```
//!
//! The exchange itself (random query ids, reply matching, timeout) is
//! handled by `hickory-client`; replies that do not belong to our query
//! are dropped by the client and never reach this module.

use async_trait::async_trait;
use ddns_core::config::ObserverConfig;
use ddns_core::traits::IpSource;
use ddns_core::{Error, ResolutionError, Result};
use hickory_client::client::{Client, ClientHandle};
use hickory_proto::op::Message;
use hickory_proto::rr::{DNSClass, Name, RData, RecordType};
use hickory_proto::runtime::TokioRuntimeProvider;
use hickory_proto::udp::UdpClientStream;
use hickory_proto::xfer::DnsResponse;
use hickory_proto::{ProtoError, ProtoErrorKind};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Queries an echo resolver for the address our packets come from
#[derive(Debug, Clone)]
pub struct EchoResolverSource {
    /// Resolver endpoint as `host:port`
    server: String,

    /// Fully qualified query name
    query_name: Name,

    /// Bound on the wait for the reply
    timeout: Duration,
}

impl EchoResolverSource {
    /// Create a source
    ///
    /// # Parameters
    ///
    /// - `server`: resolver endpoint, e.g. "resolver1.opendns.com:53"
    /// - `query_name`: name to ask for, with or without trailing dot
    /// - `timeout`: how long to wait for the reply
    pub fn new(server: impl Into<String>, query_name: &str, timeout: Duration) -> Result<Self> {
        let fqdn = if query_name.ends_with('.') {
            query_name.to_string()
        } else {
            format!("{}.", query_name)
        };

        let query_name = Name::from_ascii(&fqdn)
            .map_err(|e| Error::config(format!("invalid query name '{}': {}", fqdn, e)))?;

        Ok(Self {
            server: server.into(),
            query_name,
            timeout,
        })
    }

    /// Create a source from configuration
    pub fn from_config(config: &ObserverConfig) -> Result<Self> {
        Self::new(
            config.server.clone(),
            &config.query_name,
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn transport_error(&self, reason: impl ToString) -> ResolutionError {
        ResolutionError::Transport {
            server: self.server.clone(),
            reason: reason.to_string(),
        }
    }

    /// Map a client failure onto the resolution taxonomy
    fn classify(&self, err: ProtoError) -> ResolutionError {
        match err.kind() {
            ProtoErrorKind::Timeout | ProtoErrorKind::Io(_) => self.transport_error(err),
            ProtoErrorKind::NoRecordsFound { .. } => ResolutionError::EmptyAnswer {
                server: self.server.clone(),
                query: self.query_name.to_string(),
            },
            _ => ResolutionError::Malformed {
                server: self.server.clone(),
                reason: err.to_string(),
            },
        }
    }

    /// Send one A query and wait for the matching reply
    async fn exchange(&self) -> std::result::Result<DnsResponse, ResolutionError> {
        let target: SocketAddr = tokio::net::lookup_host(self.server.as_str())
            .await
            .map_err(|e| self.transport_error(e))?
            .next()
            .ok_or_else(|| self.transport_error("resolver host has no address"))?;

        let stream = UdpClientStream::builder(target, TokioRuntimeProvider::default())
            .with_timeout(Some(self.timeout))
            .build();
        let (mut client, background) = Client::connect(stream)
            .await
            .map_err(|e| self.classify(e))?;
        let background = tokio::spawn(background);

        let response = client
            .query(self.query_name.clone(), DNSClass::IN, RecordType::A)
            .await;
        background.abort();

        response.map_err(|e| self.classify(e))
    }
}

/// Pick the first A answer out of a reply
///
/// Non-address answers (e.g. a CNAME chain) are skipped.
pub(crate) fn first_address(
    response: &Message,
    server: &str,
    query: &Name,
) -> std::result::Result<IpAddr, ResolutionError> {
    let answers = response.answers();
    if answers.is_empty() {
        return Err(ResolutionError::EmptyAnswer {
            server: server.to_string(),
            query: query.to_string(),
        });
    }

    answers
        .iter()
        .find_map(|record| match record.data() {
            RData::A(a) => Some(IpAddr::V4(a.0)),
            _ => None,
        })
        .ok_or_else(|| ResolutionError::NoAddressRecord {
            server: server.to_string(),
            answers: answers.len(),
        })
}

#[async_trait]
impl IpSource for EchoResolverSource {
    async fn current(&self) -> Result<IpAddr> {
        let response = self.exchange().await?;

        tracing::trace!(
            server = %self.server,
            answers = response.answers().len(),
            "echo resolver replied"
        );

        let ip = first_address(&response, &self.server, &self.query_name)?;
        tracing::debug!(server = %self.server, %ip, "resolved observed address");
        Ok(ip)
    }

    fn describe(&self) -> String {
        format!("echo resolver {} ({})", self.server, self.query_name)
    }
}
