// # IP Source Trait
//
// Defines the interface for producing a single IP address on demand.
//
// ## Implementations
//
// - `SystemResolverSource` (`ddns-ip-dns`): the recorded address, i.e. what
//   standard name resolution currently returns for the domain
// - `EchoResolverSource` (`ddns-ip-dns`): the observed address, i.e. what an
//   external name server sees as the source of our query
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//     let ip = source.current().await?;
//     println!("{} says {}", source.describe(), ip);
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for IP source implementations
///
/// A source performs exactly one lookup per call. It holds no cache and
/// never retries: a failed lookup is returned to the engine, which ends
/// the run.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Resolve the address this source is responsible for
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: exactly one address
    /// - `Err(Error::Resolution)`: if no usable address could be produced
    async fn current(&self) -> Result<IpAddr, crate::Error>;

    /// Short human-readable description (for logging/debugging)
    fn describe(&self) -> String;
}
