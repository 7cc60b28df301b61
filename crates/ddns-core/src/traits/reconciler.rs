// # Record Reconciler Trait
//
// The seam between the orchestrator and the zone/record reconciliation
// pass. `ZoneReconciler` is the production implementation; tests plug in
// a spy to observe whether (and with what) reconciliation was invoked.

use async_trait::async_trait;
use std::net::IpAddr;

/// Summary of one successful reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Zones enumerated
    pub zones_scanned: usize,
    /// Records enumerated across all zones
    pub records_scanned: usize,
    /// Apex address records updated
    pub records_updated: usize,
    /// Apex address records a dry run left untouched
    pub records_pending: usize,
}

/// Brings provider records in line with a target address
#[async_trait]
pub trait RecordReconciler: Send + Sync {
    /// Run one reconciliation pass towards `target`
    async fn reconcile(&self, target: IpAddr) -> Result<ReconcileReport, crate::Error>;
}
