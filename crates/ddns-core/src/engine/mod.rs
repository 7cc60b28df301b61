//! Core synchronisation engine
//!
//! The SyncEngine is responsible for:
//! - Resolving the recorded address (what DNS currently publishes)
//! - Resolving the observed address (what the outside world sees)
//! - Comparing the two
//! - Invoking the reconciler only when they differ
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐
//! │ IpSource         │   │ IpSource         │
//! │ (recorded)       │   │ (observed)       │
//! └──────────────────┘   └──────────────────┘
//!          │ 1                    │ 2
//!          └─────────┬────────────┘
//!                    ▼
//!            ┌──────────────┐  3. compare
//!            │  SyncEngine  │───────────────► EventSink
//!            └──────────────┘
//!                    │ 4. only on mismatch
//!                    ▼
//!          ┌──────────────────┐
//!          │ RecordReconciler │
//!          └──────────────────┘
//! ```
//!
//! Every step runs strictly after the previous one; the first failure ends
//! the run and is returned to the caller.

use crate::compare::addresses_match;
use crate::error::Result;
use crate::events::{EventSink, SyncEvent};
use crate::traits::{IpSource, ReconcileReport, RecordReconciler};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Published and observed addresses already agree
    InSync { address: IpAddr },

    /// DNS was reconciled towards the observed address
    Updated {
        address: IpAddr,
        report: ReconcileReport,
    },
}

impl SyncOutcome {
    /// Number of records changed by the run
    pub fn records_updated(&self) -> usize {
        match self {
            SyncOutcome::InSync { .. } => 0,
            SyncOutcome::Updated { report, .. } => report.records_updated,
        }
    }

    /// Number of records a dry run would have changed
    pub fn records_pending(&self) -> usize {
        match self {
            SyncOutcome::InSync { .. } => 0,
            SyncOutcome::Updated { report, .. } => report.records_pending,
        }
    }
}

/// Core synchronisation engine
///
/// ## Lifecycle
///
/// 1. Create with [`SyncEngine::new()`]
/// 2. Call [`SyncEngine::run_once()`]
/// 3. Drop
///
/// Nothing is carried over between runs; each call starts from fresh
/// lookups. Scheduling repeated runs is left to an external trigger.
pub struct SyncEngine {
    /// Source of the currently published address
    recorded: Box<dyn IpSource>,

    /// Source of our externally observed address
    observed: Box<dyn IpSource>,

    /// Applies the observed address on mismatch
    reconciler: Box<dyn RecordReconciler>,

    /// Step-level event sink
    events: Arc<dyn EventSink>,
}

impl SyncEngine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `recorded`: resolves the address currently published in DNS
    /// - `observed`: resolves the address the host appears to have
    /// - `reconciler`: updates provider records on mismatch
    /// - `events`: receives one event per step
    pub fn new(
        recorded: Box<dyn IpSource>,
        observed: Box<dyn IpSource>,
        reconciler: Box<dyn RecordReconciler>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            recorded,
            observed,
            reconciler,
            events,
        }
    }

    /// Run one synchronisation
    ///
    /// # Returns
    ///
    /// - `Ok(SyncOutcome)`: DNS was already correct, or was reconciled
    /// - `Err(Error)`: the first failure encountered; later steps did not run
    pub async fn run_once(&self) -> Result<SyncOutcome> {
        debug!(source = %self.recorded.describe(), "resolving recorded address");
        let recorded = self.recorded.current().await?;
        self.events.emit(SyncEvent::RecordedResolved { ip: recorded });

        debug!(source = %self.observed.describe(), "resolving observed address");
        let observed = self.observed.current().await?;
        self.events.emit(SyncEvent::ObservedResolved { ip: observed });

        if addresses_match(recorded, observed) {
            self.events.emit(SyncEvent::AddressesMatch { ip: observed });
            self.events.emit(SyncEvent::Finished { updated: 0 });
            return Ok(SyncOutcome::InSync { address: observed });
        }

        self.events.emit(SyncEvent::AddressMismatch { recorded, observed });

        let report = self.reconciler.reconcile(observed).await?;
        self.events.emit(SyncEvent::Finished {
            updated: report.records_updated,
        });

        Ok(SyncOutcome::Updated {
            address: observed,
            report,
        })
    }
}
