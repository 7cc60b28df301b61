// # ddns-core
//
// Core library for the single-shot DDNS apex synchronizer.
//
// ## Architecture Overview
//
// This library provides the decision-and-reconciliation logic:
// - **IpSource**: Trait for producing one IP address (recorded or observed)
// - **compare**: Canonicalising address equality
// - **DnsProvider**: Trait for listing zones/records and updating records
// - **ZoneReconciler**: One pass over every zone, rewriting apex A records
// - **SyncEngine**: Resolve → resolve → compare → reconcile on mismatch
// - **EventSink**: Injected receiver of step-level events
// - **SecretSource**: Key → secret lookups for provider credentials
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Run-to-completion**: One invocation, no loops, no persisted state
// 3. **Fail-fast**: The first resolution or listing failure ends the run
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod compare;
pub mod engine;
pub mod reconcile;
pub mod events;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{
    DnsProvider, DnsRecord, EnvSecretSource, IpSource, ReconcileReport, RecordReconciler,
    SecretSource, StaticSecretSource, Zone,
};
pub use compare::addresses_match;
pub use engine::{SyncEngine, SyncOutcome};
pub use reconcile::{ZoneReconciler, is_apex_address_record};
pub use events::{ChannelEventSink, EventSink, NoopEventSink, SyncEvent, TracingEventSink};
pub use config::{ObserverConfig, ProviderConfig, SyncConfig};
pub use error::{Error, ResolutionError, Result};
