// # DNS IP Sources
//
// This crate provides the two IP sources used by the DDNS synchronizer.
//
// ## Sources
//
// - [`SystemResolverSource`]: the **recorded** address. Resolves the
//   configured domain through the operating system's resolver and returns
//   the first address, i.e. what the world currently sees in DNS.
// - [`EchoResolverSource`]: the **observed** address. Sends one A query for
//   a special name (`myip.opendns.com` by default) over UDP to a resolver
//   that answers with the address the query came from.
//
// Each call performs exactly one lookup. There is no cache, no fallback
// resolver and no retry; failures go back to the engine as
// `Error::Resolution`.

mod echo;
mod system;

pub use echo::EchoResolverSource;
pub use system::SystemResolverSource;
