//! Core traits for dnsync
//!
//! - [`IpSource`]: Resolve the caller's public IP
//! - [`DnsProvider`]: Read and overwrite the managed DNS record

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{IpSource, PublicIp};
pub use dns_provider::{DnsProvider, DnsRecord, RecordUpdate};
