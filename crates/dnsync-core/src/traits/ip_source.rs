// # IP Source Trait
//
// Defines the interface for resolving the caller's current public IP.
//
// ## Implementations
//
// - HTTP echo service: `dnsync-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsync_core::IpSource;
//
// let source = /* IpSource implementation */;
// let ip = source.current().await?;
// println!("public IP: {}", ip);
// ```

use async_trait::async_trait;
use std::fmt;

/// The caller's public IP as reported by the echo service.
///
/// Holds the response body trimmed of surrounding whitespace. The address
/// syntax is not validated; comparisons against record content are plain
/// string equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicIp(String);

impl PublicIp {
    /// Build from a raw echo body, trimming surrounding whitespace
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    /// The trimmed address text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether trimming left nothing behind
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PublicIp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trait for IP source implementations
///
/// An IP source performs exactly one outbound lookup per call. It never
/// caches, retries or polls; the reconciler decides when to call it.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Resolve the current public IP
    ///
    /// # Returns
    ///
    /// - `Ok(PublicIp)`: The trimmed address text
    /// - `Err(Error)`: Network failure, non-success status or unusable body
    async fn current(&self) -> Result<PublicIp, crate::Error>;

    /// Name of the source (for logging)
    fn source_name(&self) -> &str;
}
