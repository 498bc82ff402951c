// # dnsync-core
//
// Core library for dnsync, a one-shot dynamic DNS updater.
//
// ## Architecture Overview
//
// A run reconciles one provider-hosted DNS record with the caller's
// current public IP:
// - **IpSource**: Trait for resolving the public IP
// - **DnsProvider**: Trait for reading and overwriting the record
// - **Reconciler**: Resolve → Fetch → Compare → (Update | Skip)
// - **RetryPolicy**: Opt-in bounded retry around each step
//
// ## Design Principles
//
// 1. **Stateless**: Every run starts from scratch; the provider's record is
//    the only durable state
// 2. **Sequential**: One request at a time, first failure ends the run
// 3. **Injected configuration**: Components receive a `DdnsConfig`, they
//    never read the environment

pub mod traits;
pub mod reconciler;
pub mod config;
pub mod error;
pub mod retry;

// Re-export core types for convenience
pub use traits::{DnsProvider, DnsRecord, IpSource, PublicIp, RecordUpdate};
pub use reconciler::{Outcome, Reconciler, plan_update};
pub use config::{DdnsConfig, RunMode, TtlPolicy};
pub use error::{Error, Result};
pub use retry::RetryPolicy;
