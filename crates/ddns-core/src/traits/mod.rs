//! Core traits for the DDNS synchronizer
//!
//! - [`IpSource`]: Produce one IP address on demand
//! - [`DnsProvider`]: List zones/records and update records via a provider API
//! - [`RecordReconciler`]: Apply a target address to the provider
//! - [`SecretSource`]: Key → secret lookups for credentials

pub mod ip_source;
pub mod dns_provider;
pub mod reconciler;
pub mod secret_source;

pub use ip_source::IpSource;
pub use dns_provider::{DnsProvider, DnsRecord, Zone, ADDRESS_RECORD_TYPE};
pub use reconciler::{RecordReconciler, ReconcileReport};
pub use secret_source::{EnvSecretSource, SecretSource, StaticSecretSource, DEFAULT_SECRET_ENV_PREFIX};
