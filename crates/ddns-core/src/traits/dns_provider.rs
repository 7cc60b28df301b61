// # DNS Provider Trait
//
// Defines the four zone-management operations the reconciler needs from a
// DNS-hosting provider.
//
// ## Implementations
//
// - Cloudflare: `ddns-provider-cloudflare` crate
//
// Authentication happens when the provider is constructed; the trait only
// exposes the list and update shapes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Type tag of the only record kind this system touches
pub const ADDRESS_RECORD_TYPE: &str = "A";

/// A provider-managed DNS zone
///
/// The name is the zone apex (e.g. "example.com").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Provider-specific zone identifier
    pub id: String,
    /// Apex name of the zone
    pub name: String,
}

impl Zone {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A DNS record as listed by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Provider-specific record identifier
    pub id: String,
    /// Record type tag ("A", "AAAA", "CNAME", ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Fully qualified record name
    pub name: String,
    /// Record content; the textual IP address for address records
    pub content: String,
    /// Time-to-live as reported by the provider
    #[serde(default)]
    pub ttl: Option<u32>,
    /// Provider-specific flag (Cloudflare proxying)
    #[serde(default)]
    pub proxied: Option<bool>,
    /// Free-form note attached to the record
    #[serde(default)]
    pub comment: Option<String>,
    /// Provider-side labels attached to the record
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl DnsRecord {
    /// Create an address record with no metadata
    pub fn address(
        id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::new(id, ADDRESS_RECORD_TYPE, name, content)
    }

    pub fn new(
        id: impl Into<String>,
        record_type: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            record_type: record_type.into(),
            name: name.into(),
            content: content.into(),
            ttl: None,
            proxied: None,
            comment: None,
            tags: None,
        }
    }

    /// Whether this record is of the address-record type
    pub fn is_address_record(&self) -> bool {
        self.record_type == ADDRESS_RECORD_TYPE
    }
}

/// Trait for DNS provider implementations
///
/// # Trust Level: Untrusted
///
/// Providers perform API calls against their own endpoints and nothing
/// else. They never decide whether an update is needed, never retry and
/// never cache: every call goes to the provider.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List every zone accessible with the provider's credentials
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Zone>)`: all zones, across every result page
    /// - `Err(Error::ProviderAuth | Error::ProviderList)`: if enumeration failed
    async fn list_zones(&self) -> Result<Vec<Zone>, crate::Error>;

    /// List every DNS record of a zone
    ///
    /// No type filter is applied; callers filter locally.
    async fn list_records(&self, zone: &Zone) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Replace a record with the given payload
    ///
    /// The record is addressed by `zone.id` and `record.id`.
    async fn update_record(&self, zone: &Zone, record: &DnsRecord) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;

    /// True when `update_record` only reports what it would send
    fn is_dry_run(&self) -> bool {
        false
    }
}
