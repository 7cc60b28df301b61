//! Zone/record reconciliation
//!
//! One linear pass over the provider's zones:
//!
//! ```text
//! list_zones ──► for each zone ──► list_records ──► for each record
//!                                                     │
//!                             type == "A" && name == zone.name ?
//!                                                     │ yes
//!                                                     ▼
//!                                        content = target; update_record
//! ```
//!
//! Listing failures abort the whole pass. Update failures do not: every
//! qualifying record gets its update attempt, and the failures are
//! reported together as [`Error::Update`] once the pass is over.

use crate::compare::canonical;
use crate::error::{Error, RecordUpdateFailure, Result, UpdateFailures};
use crate::events::{EventSink, SyncEvent};
use crate::traits::{DnsProvider, DnsRecord, RecordReconciler, ReconcileReport, Zone};
use async_trait::async_trait;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::debug;

/// Whether a record is an address record sitting at its zone's apex
///
/// Only records passing this test are ever modified.
pub fn is_apex_address_record(zone: &Zone, record: &DnsRecord) -> bool {
    record.is_address_record() && record.name == zone.name
}

/// Reconciler that rewrites apex address records through a [`DnsProvider`]
pub struct ZoneReconciler {
    provider: Box<dyn DnsProvider>,
    events: Arc<dyn EventSink>,
}

impl ZoneReconciler {
    pub fn new(provider: Box<dyn DnsProvider>, events: Arc<dyn EventSink>) -> Self {
        Self { provider, events }
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    async fn reconcile_zone(
        &self,
        zone: &Zone,
        content: &str,
        target: IpAddr,
        report: &mut ReconcileReport,
        failures: &mut Vec<RecordUpdateFailure>,
    ) -> Result<()> {
        self.events.emit(SyncEvent::ZoneFound {
            zone: zone.name.clone(),
        });

        let records = self.provider.list_records(zone).await.map_err(|e| match e {
            Error::ProviderAuth(_) | Error::ProviderList(_) => e,
            other => Error::list(format!("records of zone {}: {}", zone.name, other)),
        })?;
        report.records_scanned += records.len();

        for record in records {
            self.events.emit(SyncEvent::RecordFound {
                zone: zone.name.clone(),
                name: record.name.clone(),
                record_type: record.record_type.clone(),
            });

            if !is_apex_address_record(zone, &record) {
                continue;
            }

            let updated = DnsRecord {
                content: content.to_string(),
                ..record
            };

            debug!(zone = %zone.name, record_id = %updated.id, %target, "updating apex record");

            match self.provider.update_record(zone, &updated).await {
                Ok(()) if self.provider.is_dry_run() => {
                    report.records_pending += 1;
                    self.events.emit(SyncEvent::RecordWouldUpdate {
                        zone: zone.name.clone(),
                        name: updated.name,
                        ip: target,
                    });
                }
                Ok(()) => {
                    report.records_updated += 1;
                    self.events.emit(SyncEvent::RecordUpdated {
                        zone: zone.name.clone(),
                        name: updated.name,
                        ip: target,
                    });
                }
                Err(e) => {
                    self.events.emit(SyncEvent::RecordUpdateFailed {
                        zone: zone.name.clone(),
                        name: updated.name.clone(),
                        error: e.to_string(),
                    });
                    failures.push(RecordUpdateFailure {
                        zone: zone.name.clone(),
                        record_id: updated.id,
                        record_name: updated.name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl RecordReconciler for ZoneReconciler {
    async fn reconcile(&self, target: IpAddr) -> Result<ReconcileReport> {
        let target = canonical(target);
        if !target.is_ipv4() {
            return Err(Error::invalid_input(format!(
                "address records hold IPv4 addresses only, got {}",
                target
            )));
        }
        let content = target.to_string();

        let zones = self.provider.list_zones().await.map_err(|e| match e {
            Error::ProviderAuth(_) | Error::ProviderList(_) => e,
            other => Error::list(format!("zones: {}", other)),
        })?;

        if zones.is_empty() {
            return Err(Error::NoZones);
        }

        let mut report = ReconcileReport {
            zones_scanned: zones.len(),
            ..ReconcileReport::default()
        };
        let mut failures = Vec::new();

        for zone in &zones {
            self.reconcile_zone(zone, &content, target, &mut report, &mut failures)
                .await?;
        }

        if !failures.is_empty() {
            return Err(Error::Update(UpdateFailures {
                failures,
                succeeded: report.records_updated,
            }));
        }

        if report.records_updated == 0 && report.records_pending == 0 {
            self.events.emit(SyncEvent::NoApexRecords {
                zones: report.zones_scanned,
            });
        }

        Ok(report)
    }
}
