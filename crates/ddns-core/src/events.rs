//! Step-level events and the sinks that receive them
//!
//! Components never reach for a process-wide logger to report progress;
//! they are handed an [`EventSink`] and emit [`SyncEvent`]s into it. The
//! binary uses [`TracingEventSink`], embedders can pick
//! [`ChannelEventSink`], and tests substitute their own recording sink.

use std::net::IpAddr;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Events emitted during a synchronisation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// The address currently published in DNS
    RecordedResolved { ip: IpAddr },

    /// The address the outside world sees for us
    ObservedResolved { ip: IpAddr },

    /// Nothing to do
    AddressesMatch { ip: IpAddr },

    /// DNS is stale, reconciliation follows
    AddressMismatch { recorded: IpAddr, observed: IpAddr },

    /// A zone was enumerated
    ZoneFound { zone: String },

    /// A record was enumerated
    RecordFound {
        zone: String,
        name: String,
        record_type: String,
    },

    /// An apex address record was updated
    RecordUpdated {
        zone: String,
        name: String,
        ip: IpAddr,
    },

    /// Dry run: an apex address record would have been updated
    RecordWouldUpdate {
        zone: String,
        name: String,
        ip: IpAddr,
    },

    /// An apex address record update failed
    RecordUpdateFailed {
        zone: String,
        name: String,
        error: String,
    },

    /// Zones exist but none has an apex address record
    NoApexRecords { zones: usize },

    /// Run completed successfully
    Finished { updated: usize },
}

/// Receiver of [`SyncEvent`]s
pub trait EventSink: Send + Sync {
    fn emit(&self, event: SyncEvent);
}

/// Renders events as `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: SyncEvent) {
        match event {
            SyncEvent::RecordedResolved { ip } => info!(%ip, "current dns address"),
            SyncEvent::ObservedResolved { ip } => info!(%ip, "observed address"),
            SyncEvent::AddressesMatch { ip } => info!(%ip, "dns is up to date"),
            SyncEvent::AddressMismatch { recorded, observed } => {
                info!(%recorded, %observed, "ip address is different, updating dns")
            }
            SyncEvent::ZoneFound { zone } => info!(%zone, "found a zone"),
            SyncEvent::RecordFound {
                zone,
                name,
                record_type,
            } => tracing::debug!(%zone, %name, %record_type, "found a dns record"),
            SyncEvent::RecordUpdated { zone, name, ip } => {
                info!(%zone, %name, %ip, "updated dns record")
            }
            SyncEvent::RecordWouldUpdate { zone, name, ip } => {
                info!(%zone, %name, %ip, "[DRY-RUN] would update dns record")
            }
            SyncEvent::RecordUpdateFailed { zone, name, error } => {
                tracing::error!(%zone, %name, %error, "failed to update dns record")
            }
            SyncEvent::NoApexRecords { zones } => {
                warn!(zones, "no apex address records found in any zone")
            }
            SyncEvent::Finished { updated } => info!(updated, "done"),
        }
    }
}

/// Forwards events to a bounded channel
///
/// When the channel is full the event is dropped with a warning rather
/// than blocking the run.
#[derive(Debug, Clone)]
pub struct ChannelEventSink {
    tx: mpsc::Sender<SyncEvent>,
}

impl ChannelEventSink {
    /// Create a sink and the receiver that yields its events
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<SyncEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: SyncEvent) {
        if self.tx.try_send(event).is_err() {
            warn!("Event channel full or closed, dropping event");
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn emit(&self, _event: SyncEvent) {}
}
