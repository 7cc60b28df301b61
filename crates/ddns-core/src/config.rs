//! Configuration types for the DDNS synchronizer
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};

/// Default echo query name: answered with the address of the asker
pub const DEFAULT_OBSERVER_QUERY: &str = "myip.opendns.com";

/// Default echo resolver endpoint
pub const DEFAULT_OBSERVER_SERVER: &str = "resolver1.opendns.com:53";

/// Default secret key for the provider API key
pub const DEFAULT_API_KEY_SECRET: &str = "cloudflare/apikey";

/// Default secret key for the provider account email
pub const DEFAULT_EMAIL_SECRET: &str = "cloudflare/email";

/// Main synchronizer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Hostname whose published address is checked (e.g. "example.com")
    pub domain: String,

    /// Observed-address lookup settings
    #[serde(default)]
    pub observer: ObserverConfig,

    /// DNS provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// List zones and records but do not modify anything
    #[serde(default)]
    pub dry_run: bool,
}

impl SyncConfig {
    /// Create a configuration for `domain` with defaults everywhere else
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            observer: ObserverConfig::default(),
            provider: ProviderConfig::default(),
            dry_run: false,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_domain_name(&self.domain)?;
        self.observer.validate()?;
        self.provider.validate()?;
        Ok(())
    }
}

/// Settings for the observed-address (echo resolver) lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObserverConfig {
    /// Name whose A answer is the address of the querying host
    #[serde(default = "default_observer_query")]
    pub query_name: String,

    /// Echo resolver as `host:port`
    #[serde(default = "default_observer_server")]
    pub server: String,

    /// How long to wait for the reply
    #[serde(default = "default_observer_timeout_secs")]
    pub timeout_secs: u64,
}

impl ObserverConfig {
    pub fn validate(&self) -> Result<(), crate::Error> {
        validate_domain_name(self.query_name.trim_end_matches('.'))
            .map_err(|e| crate::Error::config(format!("observer query name: {}", e)))?;

        match self.server.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok_and(|p| p > 0) => {}
            _ => {
                return Err(crate::Error::config(format!(
                    "observer server must be host:port, got '{}'",
                    self.server
                )));
            }
        }

        if !(1..=60).contains(&self.timeout_secs) {
            return Err(crate::Error::config(format!(
                "observer timeout must be between 1 and 60 seconds, got {}",
                self.timeout_secs
            )));
        }

        Ok(())
    }
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            query_name: default_observer_query(),
            server: default_observer_server(),
            timeout_secs: default_observer_timeout_secs(),
        }
    }
}

/// DNS provider configuration
///
/// Credentials are not stored here, only the keys under which the
/// secret source holds them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider (global API key + account email)
    Cloudflare {
        /// Secret key holding the API key
        #[serde(default = "default_api_key_secret")]
        api_key_secret: String,
        /// Secret key holding the account email
        #[serde(default = "default_email_secret")]
        email_secret: String,
        /// API base URL override
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Cloudflare {
                api_key_secret,
                email_secret,
                base_url,
            } => {
                if api_key_secret.is_empty() || email_secret.is_empty() {
                    return Err(crate::Error::config(
                        "Cloudflare secret keys cannot be empty",
                    ));
                }
                if let Some(url) = base_url
                    && !url.starts_with("https://")
                    && !url.starts_with("http://")
                {
                    return Err(crate::Error::config(format!(
                        "Cloudflare base URL must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Cloudflare {
            api_key_secret: default_api_key_secret(),
            email_secret: default_email_secret(),
            base_url: None,
        }
    }
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks: total length, label length, characters and
/// hyphen placement. A single trailing dot is not accepted here.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    if domain.is_empty() {
        return Err(crate::Error::config("Domain name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(crate::Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Domain name has empty label: '{}'",
                domain
            )));
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(crate::Error::config(format!(
                "Domain label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric and hyphen only.",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}

fn default_observer_query() -> String {
    DEFAULT_OBSERVER_QUERY.to_string()
}

fn default_observer_server() -> String {
    DEFAULT_OBSERVER_SERVER.to_string()
}

fn default_observer_timeout_secs() -> u64 {
    5
}

fn default_api_key_secret() -> String {
    DEFAULT_API_KEY_SECRET.to_string()
}

fn default_email_secret() -> String {
    DEFAULT_EMAIL_SECRET.to_string()
}
