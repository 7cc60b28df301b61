// # Cloudflare DNS Provider
//
// This crate provides a Cloudflare DNS provider implementation for the
// DDNS synchronizer.
//
// ## Capabilities
//
// - ✅ Lists every zone visible to the credentials (all result pages)
// - ✅ Lists every record of a zone, unfiltered (all result pages)
// - ✅ Replaces a record with a full payload (one PUT per call)
// - ✅ Global API key authentication (`X-Auth-Key` + `X-Auth-Email`)
// - ✅ Specific error handling for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry or backoff (a failed run is retried by the next invocation)
// - ❌ NO caching (every run lists fresh)
//
// ## Trust Level: Untrusted (DNS Provider)
//
// The provider talks to its own API endpoints and nothing else. It never
// decides which records need an update; that is the reconciler's job.
//
// ## Security Requirements
//
// - API key NEVER appears in logs or Debug output
// - Provider MUST fail fast if key or email is empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?page=..&per_page=..`
// - List DNS Records: GET `/zones/:zone_id/dns_records?page=..&per_page=..`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use ddns_core::config::ProviderConfig;
use ddns_core::traits::{DnsProvider, DnsRecord, SecretSource, Zone};
use ddns_core::{Error, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Results requested per page on list calls
const PAGE_SIZE: u32 = 50;

/// Envelope shared by every Cloudflare v4 response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiError>,
    result: Option<T>,
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: u64,
    message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    page: u32,
    #[serde(default)]
    total_pages: u32,
}

/// Body of a record replacement
///
/// PUT replaces the whole record, so every field the listing returned
/// is sent back; omitted fields would be reset.
#[derive(Debug, Serialize)]
struct RecordPayload<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ttl: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    proxied: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tags: Option<&'a [String]>,
}

impl<'a> From<&'a DnsRecord> for RecordPayload<'a> {
    fn from(record: &'a DnsRecord) -> Self {
        Self {
            record_type: &record.record_type,
            name: &record.name,
            content: &record.content,
            ttl: record.ttl,
            proxied: record.proxied,
            comment: record.comment.as_deref(),
            tags: record.tags.as_deref(),
        }
    }
}

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (zone and record listing)
/// - Log the intended PUT payload
/// - **NOT** actually modify DNS records
pub struct CloudflareProvider {
    /// Global API key
    /// ⚠️ NEVER log this value
    api_key: String,

    /// Account email paired with the API key
    email: String,

    /// API base URL (overridable for testing)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip PUT updates
    dry_run: bool,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_key", &"<REDACTED>")
            .field("email", &self.email)
            .field("base_url", &self.base_url)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_key`: Cloudflare global API key
    /// - `email`: account email the key belongs to
    /// - `dry_run`: If true, perform GET requests but skip PUT updates
    pub fn new(
        api_key: impl Into<String>,
        email: impl Into<String>,
        dry_run: bool,
    ) -> Result<Self> {
        let api_key = api_key.into();
        let email = email.into();

        if api_key.trim().is_empty() {
            return Err(Error::config("Cloudflare API key cannot be empty"));
        }
        if email.trim().is_empty() {
            return Err(Error::config("Cloudflare account email cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::provider("cloudflare", format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            email,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
            dry_run,
        })
    }

    /// Create a new Cloudflare provider (production/live mode)
    pub fn new_live(api_key: impl Into<String>, email: impl Into<String>) -> Result<Self> {
        Self::new(api_key, email, false)
    }

    /// Create a new Cloudflare provider (dry-run mode)
    pub fn new_dry_run(api_key: impl Into<String>, email: impl Into<String>) -> Result<Self> {
        Self::new(api_key, email, true)
    }

    /// Point the provider at a different API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build a provider from configuration, fetching credentials from `secrets`
    pub fn from_config(
        config: &ProviderConfig,
        secrets: &dyn SecretSource,
        dry_run: bool,
    ) -> Result<Self> {
        match config {
            ProviderConfig::Cloudflare {
                api_key_secret,
                email_secret,
                base_url,
            } => {
                let api_key = secrets.get(api_key_secret)?;
                let email = secrets.get(email_secret)?;

                if dry_run {
                    tracing::warn!(
                        "Cloudflare provider running in DRY-RUN mode - no changes will be made"
                    );
                }

                let provider = Self::new(api_key, email, dry_run)?;
                Ok(match base_url {
                    Some(url) => provider.with_base_url(url.as_str()),
                    None => provider,
                })
            }
        }
    }

    /// Start an authenticated request
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("X-Auth-Key", &self.api_key)
            .header("X-Auth-Email", &self.email)
            .header("Content-Type", "application/json")
    }

    /// Fetch every page of a list endpoint
    ///
    /// # API Call
    ///
    /// ```http
    /// GET {path}?page=N&per_page=50
    /// X-Auth-Key: <key>
    /// X-Auth-Email: <email>
    /// ```
    async fn list_all<T: DeserializeOwned>(&self, path: &str, action: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1u32;

        loop {
            tracing::debug!(path, page, "listing");

            let response = self
                .request(Method::GET, path)
                .query(&[("page", page), ("per_page", PAGE_SIZE)])
                .send()
                .await
                .map_err(|e| Error::list(format!("HTTP request failed while trying to {}: {}", action, e)))?;

            let body: ApiResponse<Vec<T>> = parse_response(response, action)
                .await
                .map_err(into_list_error)?;

            items.extend(body.result.unwrap_or_default());

            let total_pages = body.result_info.map_or(0, |info| info.total_pages.max(info.page));
            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(items)
    }
}

/// Check the HTTP status and the `success` flag, then decode the envelope
async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
    action: &str,
) -> Result<ApiResponse<T>> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        return Err(status_error(status, &error_text, action));
    }

    let body: ApiResponse<T> = response.json().await.map_err(|e| {
        Error::provider("cloudflare", format!("Failed to parse response: {}", e))
    })?;

    if !body.success {
        let errors = body
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(Error::provider(
            "cloudflare",
            format!("API error while trying to {}: {}", action, errors),
        ));
    }

    Ok(body)
}

/// Map HTTP status codes to specific errors
fn status_error(status: StatusCode, error_text: &str, action: &str) -> Error {
    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "Invalid API key/email or insufficient permissions to {}. Status: {}",
            action, status
        )),
        404 => Error::provider(
            "cloudflare",
            format!("Not found while trying to {}: {}", action, error_text),
        ),
        409 => Error::provider(
            "cloudflare",
            format!("Conflict: Record is being updated by another process. Status: {}", status),
        ),
        429 => Error::provider(
            "cloudflare",
            format!("Rate limit exceeded. Please retry later. Status: {}", status),
        ),
        500..=599 => Error::provider(
            "cloudflare",
            format!("Cloudflare server error (transient): {} - {}", status, error_text),
        ),
        _ => Error::provider(
            "cloudflare",
            format!("Failed to {}: {} - {}", action, status, error_text),
        ),
    }
}

/// Listing failures surface as `ProviderList`; auth failures stay as they are
fn into_list_error(err: Error) -> Error {
    match err {
        Error::Provider { message, .. } => Error::list(message),
        other => other,
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let zones: Vec<Zone> = self.list_all("/zones", "list zones").await?;
        tracing::debug!(count = zones.len(), "listed zones");
        Ok(zones)
    }

    async fn list_records(&self, zone: &Zone) -> Result<Vec<DnsRecord>> {
        let path = format!("/zones/{}/dns_records", zone.id);
        let action = format!("list records of zone {}", zone.name);
        let records: Vec<DnsRecord> = self.list_all(&path, &action).await?;
        tracing::debug!(zone = %zone.name, count = records.len(), "listed records");
        Ok(records)
    }

    /// Replace a DNS record
    ///
    /// # API Call
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {
    ///   "type": "A",
    ///   "name": "example.com",
    ///   "content": "1.2.3.4",
    ///   "ttl": 1,
    ///   "proxied": false
    /// }
    /// ```
    async fn update_record(&self, zone: &Zone, record: &DnsRecord) -> Result<()> {
        let path = format!("/zones/{}/dns_records/{}", zone.id, record.id);
        let payload = RecordPayload::from(record);

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send PUT request to {}{} with payload: {}",
                self.base_url,
                path,
                serde_json::to_string(&payload)?
            );
            return Ok(());
        }

        tracing::info!(
            zone = %zone.name,
            record = %record.name,
            content = %record.content,
            "Updating DNS record"
        );

        let response = self
            .request(Method::PUT, &path)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("HTTP request failed: {}", e)))?;

        let action = format!("update record {}", record.name);
        let _: ApiResponse<serde_json::Value> = parse_response(response, &action).await?;

        tracing::info!(record = %record.name, content = %record.content, "DNS record updated successfully");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}
