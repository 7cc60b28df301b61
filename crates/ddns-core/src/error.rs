//! Error types for the DDNS synchronizer
//!
//! Every failure in a run propagates up to the caller of
//! [`SyncEngine::run_once`](crate::SyncEngine::run_once). No component
//! terminates the process on its own.

use std::fmt;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS synchronizer
#[derive(Error, Debug)]
pub enum Error {
    /// Local or third-party name resolution could not produce an address
    #[error("Resolution failed: {0}")]
    Resolution(#[from] ResolutionError),

    /// Provider rejected the credentials
    #[error("Authentication failed: {0}")]
    ProviderAuth(String),

    /// Zone or record enumeration failed
    #[error("Listing failed: {0}")]
    ProviderList(String),

    /// The credentials can see no zones at all
    #[error("No zones are accessible with the configured credentials")]
    NoZones,

    /// One or more record updates failed
    #[error("{0}")]
    Update(UpdateFailures),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Secret lookup errors
    #[error("Secret error: {0}")]
    Secret(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a provider authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::ProviderAuth(msg.into())
    }

    /// Create a listing error
    pub fn list(msg: impl Into<String>) -> Self {
        Self::ProviderList(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a secret lookup error
    pub fn secret(msg: impl Into<String>) -> Self {
        Self::Secret(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// True for any address resolution failure
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution(_))
    }

    /// True when the provider refused the credentials or could not enumerate
    pub fn is_provider_list(&self) -> bool {
        matches!(self, Self::ProviderAuth(_) | Self::ProviderList(_) | Self::NoZones)
    }

    /// True for configuration and secret problems (the operator must act)
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Secret(_))
    }
}

/// Ways an IP resolver can fail to produce an address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// System name resolution failed
    #[error("lookup of {host} failed: {reason}")]
    Lookup { host: String, reason: String },

    /// System name resolution succeeded but returned nothing
    #[error("lookup of {host} returned no addresses")]
    NoAddresses { host: String },

    /// The echo resolver could not be reached or did not answer in time
    #[error("unable to reach name server {server}: {reason}")]
    Transport { server: String, reason: String },

    /// The echo resolver answered with something undecodable
    #[error("malformed reply from {server}: {reason}")]
    Malformed { server: String, reason: String },

    /// The reply carried no answers
    #[error("no answers from {server} for {query}")]
    EmptyAnswer { server: String, query: String },

    /// The reply carried answers but none of address type
    #[error("no address record among {answers} answer(s) from {server}")]
    NoAddressRecord { server: String, answers: usize },
}

/// A single record update that did not go through
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpdateFailure {
    pub zone: String,
    pub record_id: String,
    pub record_name: String,
    pub reason: String,
}

/// All record updates that failed during one reconciliation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateFailures {
    pub failures: Vec<RecordUpdateFailure>,
    /// Records that were updated successfully in the same pass
    pub succeeded: usize,
}

impl fmt::Display for UpdateFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} record update(s) failed ({} succeeded)",
            self.failures.len(),
            self.succeeded
        )?;
        for failure in &self.failures {
            write!(
                f,
                "; {} in {} [{}]: {}",
                failure.record_name, failure.zone, failure.record_id, failure.reason
            )?;
        }
        Ok(())
    }
}
