// # Secret Source Trait
//
// Synchronous key → secret lookup used to fetch provider credentials
// (e.g. "cloudflare/apikey", "cloudflare/email") before a run starts.

use std::collections::HashMap;
use std::fmt;

/// Trait for secret lookups
pub trait SecretSource: Send + Sync {
    /// Get the secret stored under `key`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: the non-empty secret value
    /// - `Err(Error::Secret)`: missing or empty
    fn get(&self, key: &str) -> Result<String, crate::Error>;
}

/// Reads secrets from environment variables
///
/// The key is upper-cased and every non-alphanumeric character becomes
/// `_`, then the prefix is prepended: with the default prefix,
/// `cloudflare/apikey` is read from `DDNS_SECRET_CLOUDFLARE_APIKEY`.
#[derive(Debug, Clone)]
pub struct EnvSecretSource {
    prefix: String,
}

/// Default environment prefix for secrets
pub const DEFAULT_SECRET_ENV_PREFIX: &str = "DDNS_SECRET_";

impl EnvSecretSource {
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_SECRET_ENV_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Environment variable name for a secret key
    pub fn variable_for(&self, key: &str) -> String {
        let suffix: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}{}", self.prefix, suffix)
    }
}

impl Default for EnvSecretSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretSource for EnvSecretSource {
    fn get(&self, key: &str) -> Result<String, crate::Error> {
        let var = self.variable_for(key);
        match std::env::var(&var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            Ok(_) => Err(crate::Error::secret(format!(
                "secret '{}' ({}) is empty",
                key, var
            ))),
            Err(e) => Err(crate::Error::secret(format!(
                "unable to read secret '{}' from {}: {}",
                key, var, e
            ))),
        }
    }
}

/// In-memory secrets, for embedding and tests
#[derive(Default, Clone)]
pub struct StaticSecretSource {
    secrets: HashMap<String, String>,
}

// Never print secret values
impl fmt::Debug for StaticSecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.secrets.keys().collect();
        keys.sort();
        f.debug_struct("StaticSecretSource")
            .field("keys", &keys)
            .finish()
    }
}

impl StaticSecretSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets.insert(key.into(), value.into());
        self
    }
}

impl SecretSource for StaticSecretSource {
    fn get(&self, key: &str) -> Result<String, crate::Error> {
        match self.secrets.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value.clone()),
            Some(_) => Err(crate::Error::secret(format!("secret '{}' is empty", key))),
            None => Err(crate::Error::secret(format!("secret '{}' not found", key))),
        }
    }
}
