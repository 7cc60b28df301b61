//! Contract Test: Zone/Record Reconciliation
//!
//! Constraints verified:
//! - Only address records named exactly like their zone are updated
//! - One pass updates every qualifying record across all zones
//! - Listing failures abort the pass
//! - Update failures are collected and surfaced, not swallowed
//! - An empty zone list is an error
//! - A dry run reports pending updates without counting them as done

mod common;

use common::*;
use ddns_core::error::Error;
use ddns_core::traits::{DnsRecord, RecordReconciler, Zone};
use ddns_core::{NoopEventSink, SyncEvent, ZoneReconciler};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

const NEW_IP: [u8; 4] = [203, 0, 113, 7];

fn reconciler(provider: &InMemoryProvider, sink: &RecordingSink) -> ZoneReconciler {
    ZoneReconciler::new(Box::new(provider.clone()), Arc::new(sink.clone()))
}

#[tokio::test]
async fn only_apex_address_record_is_updated() {
    let provider = InMemoryProvider::new().with_zone(
        Zone::new("z1", "example.com"),
        vec![
            DnsRecord::address("apex", "example.com", "198.51.100.1"),
            DnsRecord::address("www", "www.example.com", "198.51.100.1"),
            DnsRecord::new("cname", "CNAME", "example.com", "target.example.net"),
        ],
    );
    let sink = RecordingSink::new();

    let report = reconciler(&provider, &sink)
        .reconcile(IpAddr::from(NEW_IP))
        .await
        .expect("reconcile succeeds");

    assert_eq!(report.zones_scanned, 1);
    assert_eq!(report.records_scanned, 3);
    assert_eq!(report.records_updated, 1);

    let updates = provider.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, "z1");
    assert_eq!(updates[0].1.id, "apex");
    assert_eq!(updates[0].1.content, "203.0.113.7");

    assert_eq!(provider.record("z1", "www").unwrap().content, "198.51.100.1");
    assert_eq!(
        provider.record("z1", "cname").unwrap().content,
        "target.example.net"
    );
}

#[tokio::test]
async fn multi_zone_sweep_updates_one_record_per_zone() {
    let zones = ["example.com", "example.org", "example.net", "example.io"];
    let mut provider = InMemoryProvider::new();
    for (i, name) in zones.iter().enumerate() {
        provider = provider.with_zone(
            Zone::new(format!("z{}", i), *name),
            vec![
                DnsRecord::address(format!("apex{}", i), *name, "198.51.100.1"),
                DnsRecord::address(format!("mail{}", i), format!("mail.{}", name), "198.51.100.1"),
            ],
        );
    }
    let sink = RecordingSink::new();

    let report = reconciler(&provider, &sink)
        .reconcile(IpAddr::from(NEW_IP))
        .await
        .expect("reconcile succeeds");

    assert_eq!(report.zones_scanned, zones.len());
    assert_eq!(report.records_updated, zones.len());

    let updates = provider.updates();
    assert_eq!(updates.len(), zones.len());
    for (i, (zone_id, record)) in updates.iter().enumerate() {
        assert_eq!(zone_id, &format!("z{}", i));
        assert_eq!(record.id, format!("apex{}", i));
        assert_eq!(record.name, zones[i]);
        assert_eq!(record.content, "203.0.113.7");
    }

    let updated_events = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, SyncEvent::RecordUpdated { .. }))
        .count();
    assert_eq!(updated_events, zones.len());
}

#[tokio::test]
async fn update_payload_keeps_other_record_fields() {
    let mut apex = DnsRecord::address("apex", "example.com", "198.51.100.1");
    apex.ttl = Some(120);
    apex.proxied = Some(true);
    apex.comment = Some("home router".to_string());
    apex.tags = Some(vec!["owner:ops".to_string()]);
    let provider = InMemoryProvider::new().with_zone(Zone::new("z1", "example.com"), vec![apex]);

    reconciler(&provider, &RecordingSink::new())
        .reconcile(IpAddr::from(NEW_IP))
        .await
        .expect("reconcile succeeds");

    let (_, submitted) = &provider.updates()[0];
    assert_eq!(submitted.record_type, "A");
    assert_eq!(submitted.name, "example.com");
    assert_eq!(submitted.ttl, Some(120));
    assert_eq!(submitted.proxied, Some(true));
    assert_eq!(submitted.comment.as_deref(), Some("home router"));
    assert_eq!(submitted.tags, Some(vec!["owner:ops".to_string()]));
}

#[tokio::test]
async fn v4_mapped_target_is_written_as_v4() {
    let provider = InMemoryProvider::new().with_zone(
        Zone::new("z1", "example.com"),
        vec![DnsRecord::address("apex", "example.com", "198.51.100.1")],
    );

    reconciler(&provider, &RecordingSink::new())
        .reconcile(IpAddr::V6(Ipv4Addr::from(NEW_IP).to_ipv6_mapped()))
        .await
        .expect("reconcile succeeds");

    assert_eq!(provider.updates()[0].1.content, "203.0.113.7");
}

#[tokio::test]
async fn v6_target_is_rejected_before_any_call() {
    let provider = InMemoryProvider::new().with_zone(
        Zone::new("z1", "example.com"),
        vec![DnsRecord::address("apex", "example.com", "198.51.100.1")],
    );

    let err = reconciler(&provider, &RecordingSink::new())
        .reconcile("2001:db8::1".parse().unwrap())
        .await
        .expect_err("v6 target rejected");

    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(provider.listed_zones().is_empty());
    assert!(provider.updates().is_empty());
}

#[tokio::test]
async fn zone_listing_failure_aborts() {
    let provider = InMemoryProvider::failing_list_zones();

    let err = reconciler(&provider, &RecordingSink::new())
        .reconcile(IpAddr::from(NEW_IP))
        .await
        .expect_err("listing failure is fatal");

    assert!(matches!(err, Error::ProviderAuth(_)));
    assert!(provider.listed_zones().is_empty());
}

#[tokio::test]
async fn record_listing_failure_aborts_whole_pass() {
    let provider = InMemoryProvider::new()
        .with_zone(
            Zone::new("z1", "example.com"),
            vec![DnsRecord::address("a1", "example.com", "198.51.100.1")],
        )
        .with_zone(
            Zone::new("z2", "example.org"),
            vec![DnsRecord::address("a2", "example.org", "198.51.100.1")],
        )
        .with_zone(
            Zone::new("z3", "example.net"),
            vec![DnsRecord::address("a3", "example.net", "198.51.100.1")],
        )
        .fail_records_for("z2");

    let err = reconciler(&provider, &RecordingSink::new())
        .reconcile(IpAddr::from(NEW_IP))
        .await
        .expect_err("record listing failure is fatal");

    assert!(matches!(err, Error::ProviderList(ref msg) if msg.contains("example.org")));
    assert_eq!(provider.listed_zones(), vec!["z1", "z2"], "z3 must not be visited");
    assert_eq!(provider.record("z3", "a3").unwrap().content, "198.51.100.1");
}

#[tokio::test]
async fn update_failures_are_aggregated() {
    let provider = InMemoryProvider::new()
        .with_zone(
            Zone::new("z1", "example.com"),
            vec![DnsRecord::address("a1", "example.com", "198.51.100.1")],
        )
        .with_zone(
            Zone::new("z2", "example.org"),
            vec![DnsRecord::address("a2", "example.org", "198.51.100.1")],
        )
        .with_zone(
            Zone::new("z3", "example.net"),
            vec![DnsRecord::address("a3", "example.net", "198.51.100.1")],
        )
        .fail_update_for("a1")
        .fail_update_for("a3");
    let sink = RecordingSink::new();

    let err = reconciler(&provider, &sink)
        .reconcile(IpAddr::from(NEW_IP))
        .await
        .expect_err("failed updates are surfaced");

    match err {
        Error::Update(failures) => {
            assert_eq!(failures.succeeded, 1);
            let ids: Vec<_> = failures.failures.iter().map(|f| f.record_id.as_str()).collect();
            assert_eq!(ids, vec!["a1", "a3"]);
            assert_eq!(failures.failures[0].zone, "example.com");
        }
        other => panic!("expected update failure, got {:?}", other),
    }

    // The healthy record in between still got its update
    assert_eq!(provider.record("z2", "a2").unwrap().content, "203.0.113.7");

    let failed_events = sink
        .events()
        .into_iter()
        .filter(|e| matches!(e, SyncEvent::RecordUpdateFailed { .. }))
        .count();
    assert_eq!(failed_events, 2);
}

#[tokio::test]
async fn empty_zone_list_is_an_error() {
    let provider = InMemoryProvider::new();
    let reconciler = ZoneReconciler::new(Box::new(provider.clone()), Arc::new(NoopEventSink));
    assert_eq!(reconciler.provider_name(), "memory");

    let err = reconciler
        .reconcile(IpAddr::from(NEW_IP))
        .await
        .expect_err("no zones is a misconfiguration");

    assert!(matches!(err, Error::NoZones));
}

#[tokio::test]
async fn zones_without_apex_records_succeed_with_warning_event() {
    let provider = InMemoryProvider::new().with_zone(
        Zone::new("z1", "example.com"),
        vec![DnsRecord::address("www", "www.example.com", "198.51.100.1")],
    );
    let sink = RecordingSink::new();

    let report = reconciler(&provider, &sink)
        .reconcile(IpAddr::from(NEW_IP))
        .await
        .expect("nothing to update is not an error");

    assert_eq!(report.records_updated, 0);
    assert!(provider.updates().is_empty());
    assert!(sink.events().contains(&SyncEvent::NoApexRecords { zones: 1 }));
}

#[tokio::test]
async fn dry_run_reports_pending_updates() {
    let provider = InMemoryProvider::new()
        .with_zone(
            Zone::new("z1", "example.com"),
            vec![DnsRecord::address("apex", "example.com", "198.51.100.1")],
        )
        .dry_run();
    let sink = RecordingSink::new();

    let report = reconciler(&provider, &sink)
        .reconcile(IpAddr::from(NEW_IP))
        .await
        .expect("dry run succeeds");

    assert_eq!(report.records_updated, 0);
    assert_eq!(report.records_pending, 1);
    assert!(provider.updates().is_empty());
    assert_eq!(provider.record("z1", "apex").unwrap().content, "198.51.100.1");

    let events = sink.events();
    assert!(events.contains(&SyncEvent::RecordWouldUpdate {
        zone: "example.com".to_string(),
        name: "example.com".to_string(),
        ip: IpAddr::from(NEW_IP),
    }));
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, SyncEvent::RecordUpdated { .. } | SyncEvent::NoApexRecords { .. }))
    );
}
