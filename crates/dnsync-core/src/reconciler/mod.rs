//! Record reconciler
//!
//! The reconciler owns one run of the program:
//!
//! ```text
//! Start ─▶ Resolve ─▶ Fetch ─▶ Compare ─┬─▶ Update ─▶ End
//!                                        └─▶ Skip ───▶ End
//! ```
//!
//! - **Resolve**: ask the [`IpSource`] for the public IP
//! - **Fetch**: ask the [`DnsProvider`] for the managed record
//! - **Compare**: trimmed string equality of IP and record content
//! - **Update**: one full-replace write, or a logged no-op in dry-run mode
//!
//! The first failure ends the run. Nothing carries over between runs;
//! continuous monitoring means invoking the program again.

use crate::config::{DdnsConfig, RunMode, TtlPolicy};
use crate::error::Result;
use crate::retry::RetryPolicy;
use crate::traits::{DnsProvider, DnsRecord, IpSource, PublicIp, RecordUpdate};
use std::fmt;
use tracing::{debug, info};

/// What a completed run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Record content already matched the public IP
    Unchanged {
        /// The shared value
        content: String,
    },

    /// Record was overwritten
    Updated {
        /// Content before the write
        previous: String,
        /// Record as stored by the provider after the write
        record: DnsRecord,
    },

    /// Dry-run: a write was needed but not sent
    WouldUpdate {
        /// Content currently stored
        previous: String,
        /// Payload that would have been sent
        update: RecordUpdate,
    },
}

impl Outcome {
    /// Whether a write request reached the provider
    pub fn wrote(&self) -> bool {
        matches!(self, Outcome::Updated { .. })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Unchanged { content } => {
                write!(f, "IP unchanged ({}), no update needed", content)
            }
            Outcome::Updated { previous, record } => write!(
                f,
                "DNS record {} updated: {} -> {} (ttl {})",
                record.name, previous, record.content, record.ttl
            ),
            Outcome::WouldUpdate { previous, update } => write!(
                f,
                "[DRY-RUN] DNS record {} would be updated: {} -> {} (ttl {})",
                update.name, previous, update.content, update.ttl
            ),
        }
    }
}

/// Decide whether `record` needs rewriting for `public_ip`
///
/// Returns `None` when the trimmed record content equals the public IP.
/// Otherwise returns the full-replace payload: the new content, the
/// record's own type, name and proxy flag, and the TTL chosen by `ttl_policy`.
pub fn plan_update(
    public_ip: &PublicIp,
    record: &DnsRecord,
    ttl_policy: TtlPolicy,
) -> Option<RecordUpdate> {
    if record.content.trim() == public_ip.as_str() {
        return None;
    }

    Some(RecordUpdate {
        record_type: record.record_type.clone(),
        name: record.name.clone(),
        content: public_ip.as_str().to_string(),
        ttl: ttl_policy.resolve(record.ttl),
        proxied: record.proxied,
    })
}

/// Runs resolve → fetch → compare → update for one record
pub struct Reconciler {
    /// Where the public IP comes from
    ip_source: Box<dyn IpSource>,

    /// Where the record lives
    provider: Box<dyn DnsProvider>,

    /// TTL written on update
    ttl_policy: TtlPolicy,

    /// Live or dry-run
    mode: RunMode,

    /// Wrapper applied to each step
    retry: RetryPolicy,
}

impl Reconciler {
    /// Create a reconciler from the run configuration
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: &DdnsConfig,
    ) -> Self {
        Self {
            ip_source,
            provider,
            ttl_policy: config.ttl_policy,
            mode: config.mode,
            retry: config.retry,
        }
    }

    /// Execute one run
    ///
    /// # Returns
    ///
    /// - `Ok(Outcome)`: The run completed (updated, unchanged or dry-run)
    /// - `Err(Error)`: The first failure; later steps were not attempted
    pub async fn run(&self) -> Result<Outcome> {
        let public_ip = self
            .retry
            .run("IP resolution", || self.ip_source.current())
            .await?;
        info!(
            "Public IP: {} (via {})",
            public_ip,
            self.ip_source.source_name()
        );

        let record = self
            .retry
            .run("Record fetch", || self.provider.get_record())
            .await?;
        info!(
            "Current {} record {}: {} (ttl {}, proxied {})",
            record.record_type, record.name, record.content, record.ttl, record.proxied
        );

        self.reconcile(&public_ip, &record).await
    }

    /// Compare an already-resolved IP with an already-fetched record and
    /// write if they differ
    pub async fn reconcile(&self, public_ip: &PublicIp, record: &DnsRecord) -> Result<Outcome> {
        let Some(update) = plan_update(public_ip, record, self.ttl_policy) else {
            debug!("Record {} already points at {}", record.name, public_ip);
            return Ok(Outcome::Unchanged {
                content: public_ip.as_str().to_string(),
            });
        };

        let previous = record.content.trim().to_string();

        if self.mode == RunMode::DryRun {
            let payload = serde_json::to_string(&update)
                .unwrap_or_else(|_| format!("{:?}", update));
            info!(
                "[DRY-RUN] Would send PUT for record {} with payload: {}",
                record.id, payload
            );
            return Ok(Outcome::WouldUpdate { previous, update });
        }

        info!(
            "IP has changed, updating {} on {}: {} -> {}",
            update.name,
            self.provider.provider_name(),
            previous,
            update.content
        );

        let stored = self
            .retry
            .run("Record update", || self.provider.update_record(&update))
            .await?;

        Ok(Outcome::Updated {
            previous,
            record: stored,
        })
    }
}
