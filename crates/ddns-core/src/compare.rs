//! Address comparison
//!
//! Addresses are compared by value after canonicalisation, so an IPv4
//! address and its IPv4-mapped IPv6 form (`::ffff:a.b.c.d`) are equal.

use std::net::IpAddr;

/// Canonical form of an address: IPv4-mapped IPv6 collapses to IPv4
pub fn canonical(ip: IpAddr) -> IpAddr {
    ip.to_canonical()
}

/// Whether the recorded and observed addresses denote the same host
pub fn addresses_match(recorded: IpAddr, observed: IpAddr) -> bool {
    canonical(recorded) == canonical(observed)
}
