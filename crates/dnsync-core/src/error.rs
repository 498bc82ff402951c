//! Error types for dnsync
//!
//! Every failure a run can hit maps onto one variant here. The binary maps
//! `Config` to its own exit code; everything else is a runtime failure.

use thiserror::Error;

/// Result type alias for dnsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Missing, empty or malformed setting
    #[error("Configuration error: {0}")]
    Config(String),

    /// The IP echo service answered, but not with something usable
    #[error("IP resolution failed: {0}")]
    IpResolution(String),

    /// DNS, TLS, connection or timeout failure on either endpoint
    #[error("Network error: {0}")]
    Network(String),

    /// Provider rejected the credential
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Zone or record identifier does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Provider refused the write
    #[error("Update rejected: {0}")]
    UpdateRejected(String),

    /// Provider asked us to slow down (HTTP 429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Provider-side failure (HTTP 5xx)
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// Any other provider response we could not interpret
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an IP resolution error
    pub fn ip_resolution(msg: impl Into<String>) -> Self {
        Self::IpResolution(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an update-rejected error
    pub fn update_rejected(msg: impl Into<String>) -> Self {
        Self::UpdateRejected(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a provider-unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether a later attempt of the same call could succeed.
    ///
    /// Only these kinds are eligible for the retry wrapper; credential,
    /// identifier and validation failures never are.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited(_) | Self::Unavailable(_)
        )
    }

    /// Whether this is a configuration failure
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
