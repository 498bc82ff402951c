// # DNS Provider Trait
//
// Defines the interface for reading and overwriting one DNS record.
//
// ## Implementations
//
// - Cloudflare: `dnsync-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsync_core::DnsProvider;
//
// let provider = /* DnsProvider implementation */;
// let record = provider.get_record().await?;
// println!("{} {} -> {}", record.record_type, record.name, record.content);
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One provider-managed DNS record, as read during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// The record ID (provider-assigned)
    pub id: String,
    /// Record type (A, AAAA, ...)
    #[serde(rename = "type")]
    pub record_type: String,
    /// Hostname
    pub name: String,
    /// Current content (an IP address for A/AAAA)
    pub content: String,
    /// Time-to-live in seconds (1 means "automatic" on Cloudflare)
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    /// Whether traffic is routed through the provider's edge
    #[serde(default)]
    pub proxied: bool,
}

fn default_ttl() -> u32 {
    1
}

/// Full-replace payload for a record write
///
/// Serializes to exactly `{type, name, content, ttl, proxied}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordUpdate {
    /// Record type, carried over from the current record
    #[serde(rename = "type")]
    pub record_type: String,
    /// Hostname, carried over from the current record
    pub name: String,
    /// New content
    pub content: String,
    /// TTL chosen by the TTL policy
    pub ttl: u32,
    /// Proxy flag, carried over from the current record
    pub proxied: bool,
}

/// Trait for DNS provider implementations
///
/// A provider is bound to a single zone and record when it is built. Each
/// method performs one API call and returns the outcome; it never retries,
/// never compares addresses and never decides whether a write is needed.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetch the current state of the managed record
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecord)`: The record as stored by the provider
    /// - `Err(Error)`: Authentication, not-found, transport or format failure
    async fn get_record(&self) -> Result<DnsRecord, crate::Error>;

    /// Overwrite the managed record with `update`
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecord)`: The record as stored after the write
    /// - `Err(Error)`: The write was rejected or never reached the provider
    async fn update_record(&self, update: &RecordUpdate) -> Result<DnsRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
