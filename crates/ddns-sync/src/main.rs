// # ddns-sync - single-shot DDNS synchronizer
//
// This binary is a THIN integration layer. All decision and
// reconciliation logic lives in ddns-core.
//
// One invocation:
// 1. Reads configuration from environment variables
// 2. Reads provider credentials from the secret source
// 3. Builds the IP sources, the provider and the engine
// 4. Runs one synchronisation and exits
//
// Repeated runs are the job of an external scheduler (cron, systemd timer).
//
// ## Configuration
//
// - `DDNS_DOMAIN`: Domain whose published address is checked (required)
// - `DDNS_OBSERVER_QUERY`: Echo query name (default: myip.opendns.com)
// - `DDNS_OBSERVER_SERVER`: Echo resolver host:port (default: resolver1.opendns.com:53)
// - `DDNS_OBSERVER_TIMEOUT_SECS`: Echo reply timeout (default: 5)
// - `DDNS_CLOUDFLARE_BASE_URL`: Cloudflare API base override (optional)
// - `DDNS_MODE`: `live` (default) or `dry-run`
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Secrets
//
// - `DDNS_SECRET_CLOUDFLARE_APIKEY`: secret `cloudflare/apikey`
// - `DDNS_SECRET_CLOUDFLARE_EMAIL`: secret `cloudflare/email`
//
// ## Example
//
// ```bash
// export DDNS_DOMAIN=example.com
// export DDNS_SECRET_CLOUDFLARE_APIKEY=your_key
// export DDNS_SECRET_CLOUDFLARE_EMAIL=you@example.com
//
// ddns-sync
// ```

use anyhow::{Context, Result};
use ddns_core::config::{
    DEFAULT_API_KEY_SECRET, DEFAULT_EMAIL_SECRET, ObserverConfig, ProviderConfig, SyncConfig,
};
use ddns_core::{
    EnvSecretSource, EventSink, SecretSource, SyncEngine, SyncOutcome, TracingEventSink,
    ZoneReconciler,
};
use ddns_ip_dns::{EchoResolverSource, SystemResolverSource};
use ddns_provider_cloudflare::CloudflareProvider;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Run completed (DNS already correct, or updated)
/// - 1: Configuration, secret or startup error
/// - 2: Runtime error (resolution, provider or update failure)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncExitCode {
    /// Run completed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    sync: SyncConfig,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key → value lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let domain = lookup("DDNS_DOMAIN")
            .filter(|d| !d.trim().is_empty())
            .context(
                "DDNS_DOMAIN is required. Set it via: export DDNS_DOMAIN=example.com",
            )?;

        let defaults = ObserverConfig::default();
        let observer = ObserverConfig {
            query_name: lookup("DDNS_OBSERVER_QUERY").unwrap_or(defaults.query_name),
            server: lookup("DDNS_OBSERVER_SERVER").unwrap_or(defaults.server),
            timeout_secs: match lookup("DDNS_OBSERVER_TIMEOUT_SECS") {
                Some(raw) => raw.trim().parse().with_context(|| {
                    format!("DDNS_OBSERVER_TIMEOUT_SECS must be a number. Got: {}", raw)
                })?,
                None => defaults.timeout_secs,
            },
        };

        let provider = ProviderConfig::Cloudflare {
            api_key_secret: DEFAULT_API_KEY_SECRET.to_string(),
            email_secret: DEFAULT_EMAIL_SECRET.to_string(),
            base_url: lookup("DDNS_CLOUDFLARE_BASE_URL"),
        };

        let dry_run = match lookup("DDNS_MODE")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "" | "live" => false,
            "dry-run" => true,
            other => anyhow::bail!(
                "DDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                other
            ),
        };

        Ok(Self {
            sync: SyncConfig {
                domain: domain.trim().to_string(),
                observer,
                provider,
                dry_run,
            },
            log_level: lookup("DDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.sync.validate()?;
        self.tracing_level()?;
        Ok(())
    }

    fn tracing_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "DDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return SyncExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = config.tracing_level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    info!(domain = %config.sync.domain, "Starting ddns-sync");

    // Single-threaded: every step runs after the previous one
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::RuntimeError.into();
        }
    };

    let secrets = EnvSecretSource::new();
    let code = rt.block_on(async {
        match run_sync(&config.sync, &secrets).await {
            Ok(outcome) => {
                info!(
                    updated = outcome.records_updated(),
                    would_update = outcome.records_pending(),
                    "Run completed"
                );
                SyncExitCode::Success
            }
            Err(e) => {
                error!("Run failed: {}", e);
                exit_code_for(&e)
            }
        }
    });

    code.into()
}

/// Classify a failed run
fn exit_code_for(err: &ddns_core::Error) -> SyncExitCode {
    if err.is_config() {
        SyncExitCode::ConfigError
    } else {
        SyncExitCode::RuntimeError
    }
}

/// Build the collaborators and run one synchronisation
async fn run_sync(
    config: &SyncConfig,
    secrets: &dyn SecretSource,
) -> ddns_core::Result<SyncOutcome> {
    let events: Arc<dyn EventSink> = Arc::new(TracingEventSink);

    let provider = CloudflareProvider::from_config(&config.provider, secrets, config.dry_run)?;
    let recorded = SystemResolverSource::new(config.domain.clone());
    let observed = EchoResolverSource::from_config(&config.observer)?;

    let engine = SyncEngine::new(
        Box::new(recorded),
        Box::new(observed),
        Box::new(ZoneReconciler::new(Box::new(provider), events.clone())),
        events,
    );

    engine.run_once().await
}
