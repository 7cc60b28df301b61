//! Test doubles and common utilities for contract tests
//!
//! These doubles count and record every call so tests can assert on what
//! the engine and reconciler did, not just on what they returned.

#![allow(dead_code)]

use ddns_core::error::{Error, ResolutionError, Result};
use ddns_core::events::{EventSink, SyncEvent};
use ddns_core::traits::{
    DnsProvider, DnsRecord, IpSource, ReconcileReport, RecordReconciler, Zone,
};
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpSource that returns a fixed address (or a fixed failure)
#[derive(Clone)]
pub struct FixedIpSource {
    result: std::result::Result<IpAddr, ResolutionError>,
    calls: Arc<AtomicUsize>,
}

impl FixedIpSource {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            result: Ok(ip),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(error: ResolutionError) -> Self {
        Self {
            result: Err(error),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of times current() was called
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for FixedIpSource {
    async fn current(&self) -> Result<IpAddr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(Error::from)
    }

    fn describe(&self) -> String {
        "fixed".to_string()
    }
}

/// A reconciler that only records its invocations
#[derive(Clone, Default)]
pub struct SpyReconciler {
    targets: Arc<Mutex<Vec<IpAddr>>>,
    fail: bool,
}

impl SpyReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Targets passed to reconcile(), in call order
    pub fn targets(&self) -> Vec<IpAddr> {
        self.targets.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RecordReconciler for SpyReconciler {
    async fn reconcile(&self, target: IpAddr) -> Result<ReconcileReport> {
        self.targets.lock().unwrap().push(target);
        if self.fail {
            return Err(Error::list("spy failure"));
        }
        Ok(ReconcileReport {
            zones_scanned: 1,
            records_scanned: 1,
            records_updated: 1,
            records_pending: 0,
        })
    }
}

/// An in-memory provider: zones with records, plus failure injection
#[derive(Clone, Default)]
pub struct InMemoryProvider {
    zones: Arc<Mutex<Vec<(Zone, Vec<DnsRecord>)>>>,
    updates: Arc<Mutex<Vec<(String, DnsRecord)>>>,
    listed_zones: Arc<Mutex<Vec<String>>>,
    fail_list_zones: bool,
    fail_records_for: Arc<Mutex<HashSet<String>>>,
    fail_update_for: Arc<Mutex<HashSet<String>>>,
    dry_run: bool,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zone(self, zone: Zone, records: Vec<DnsRecord>) -> Self {
        self.zones.lock().unwrap().push((zone, records));
        self
    }

    /// Accept updates without applying them
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn failing_list_zones() -> Self {
        Self {
            fail_list_zones: true,
            ..Self::default()
        }
    }

    /// Make list_records() fail for the zone with this id
    pub fn fail_records_for(self, zone_id: &str) -> Self {
        self.fail_records_for
            .lock()
            .unwrap()
            .insert(zone_id.to_string());
        self
    }

    /// Make update_record() fail for the record with this id
    pub fn fail_update_for(self, record_id: &str) -> Self {
        self.fail_update_for
            .lock()
            .unwrap()
            .insert(record_id.to_string());
        self
    }

    /// Updates that went through: (zone id, submitted record)
    pub fn updates(&self) -> Vec<(String, DnsRecord)> {
        self.updates.lock().unwrap().clone()
    }

    /// Zone ids whose records were listed, in order
    pub fn listed_zones(&self) -> Vec<String> {
        self.listed_zones.lock().unwrap().clone()
    }

    /// Current provider-side state of a record
    pub fn record(&self, zone_id: &str, record_id: &str) -> Option<DnsRecord> {
        self.zones
            .lock()
            .unwrap()
            .iter()
            .find(|(z, _)| z.id == zone_id)
            .and_then(|(_, records)| records.iter().find(|r| r.id == record_id).cloned())
    }
}

#[async_trait::async_trait]
impl DnsProvider for InMemoryProvider {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        if self.fail_list_zones {
            return Err(Error::auth("invalid credentials"));
        }
        Ok(self
            .zones
            .lock()
            .unwrap()
            .iter()
            .map(|(z, _)| z.clone())
            .collect())
    }

    async fn list_records(&self, zone: &Zone) -> Result<Vec<DnsRecord>> {
        self.listed_zones.lock().unwrap().push(zone.id.clone());
        if self.fail_records_for.lock().unwrap().contains(&zone.id) {
            return Err(Error::provider("memory", "record listing unavailable"));
        }
        self.zones
            .lock()
            .unwrap()
            .iter()
            .find(|(z, _)| z.id == zone.id)
            .map(|(_, records)| records.clone())
            .ok_or_else(|| Error::list(format!("unknown zone {}", zone.id)))
    }

    async fn update_record(&self, zone: &Zone, record: &DnsRecord) -> Result<()> {
        if self.fail_update_for.lock().unwrap().contains(&record.id) {
            return Err(Error::provider("memory", "HTTP 500"));
        }
        if self.dry_run {
            return Ok(());
        }
        self.updates
            .lock()
            .unwrap()
            .push((zone.id.clone(), record.clone()));

        let mut zones = self.zones.lock().unwrap();
        if let Some(stored) = zones
            .iter_mut()
            .find(|(z, _)| z.id == zone.id)
            .and_then(|(_, records)| records.iter_mut().find(|r| r.id == record.id))
        {
            *stored = record.clone();
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

/// An event sink that keeps every event
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SyncEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: SyncEvent) {
        self.events.lock().unwrap().push(event);
    }
}
