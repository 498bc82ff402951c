//! Configuration for a dnsync run
//!
//! All settings come from environment variables. The binary builds one
//! [`DdnsConfig`] at startup and hands it to the components; nothing below
//! the binary reads the environment itself.

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use std::fmt;
use std::time::Duration;

/// Bearer credential for the provider API
pub const ENV_API_TOKEN: &str = "API_TOKEN";
/// Accepted alias for [`ENV_API_TOKEN`]
pub const ENV_API_TOKEN_FALLBACK: &str = "CLOUDFLARE_API_TOKEN";
/// Zone identifier
pub const ENV_ZONE_ID: &str = "ZONE_ID";
/// Record identifier
pub const ENV_RECORD_ID: &str = "RECORD_ID";
/// IP echo endpoint override
pub const ENV_IP_ECHO_URL: &str = "IP_ECHO_URL";
/// Provider API base URL override
pub const ENV_API_BASE: &str = "CLOUDFLARE_API_BASE";
/// Per-request timeout in seconds
pub const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
/// TTL policy: seconds or `preserve`
pub const ENV_RECORD_TTL: &str = "RECORD_TTL";
/// `live` or `dry-run`
pub const ENV_MODE: &str = "DDNS_MODE";
/// Extra attempts for transient failures
pub const ENV_MAX_RETRIES: &str = "DDNS_MAX_RETRIES";
/// Base backoff delay in seconds
pub const ENV_RETRY_DELAY_SECS: &str = "DDNS_RETRY_DELAY_SECS";
/// Log level
pub const ENV_LOG_LEVEL: &str = "DDNS_LOG_LEVEL";

/// Default IP echo endpoint (plain-text body)
pub const DEFAULT_IP_ECHO_URL: &str = "https://checkip.amazonaws.com";

/// Cloudflare API base URL
pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// TTL written on every update unless configured otherwise
pub const DEFAULT_RECORD_TTL: u32 = 120;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// How the TTL of an updated record is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlPolicy {
    /// Always write this TTL
    Fixed(u32),
    /// Keep whatever TTL the record already has
    Preserve,
}

impl TtlPolicy {
    /// TTL to send for a record currently carrying `current_ttl`
    pub fn resolve(&self, current_ttl: u32) -> u32 {
        match self {
            TtlPolicy::Fixed(ttl) => *ttl,
            TtlPolicy::Preserve => current_ttl,
        }
    }

    fn parse(raw: &str) -> Result<Self> {
        if raw.eq_ignore_ascii_case("preserve") {
            return Ok(TtlPolicy::Preserve);
        }

        let ttl: u32 = raw.parse().map_err(|_| {
            Error::config(format!(
                "{} must be a number of seconds or 'preserve'. Got: {}",
                ENV_RECORD_TTL, raw
            ))
        })?;

        if !(1..=86400).contains(&ttl) {
            return Err(Error::config(format!(
                "{} must be between 1 and 86400 seconds. Got: {}",
                ENV_RECORD_TTL, ttl
            )));
        }

        Ok(TtlPolicy::Fixed(ttl))
    }
}

impl Default for TtlPolicy {
    fn default() -> Self {
        TtlPolicy::Fixed(DEFAULT_RECORD_TTL)
    }
}

/// Whether the reconciler may write to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Resolve, fetch and write when needed
    #[default]
    Live,
    /// Resolve and fetch, but only log the write that would happen
    DryRun,
}

impl RunMode {
    fn parse(raw: &str) -> Result<Self> {
        match raw.to_lowercase().as_str() {
            "live" => Ok(RunMode::Live),
            "dry-run" | "dry_run" | "dryrun" => Ok(RunMode::DryRun),
            _ => Err(Error::config(format!(
                "{} '{}' is not valid. Valid modes: live, dry-run",
                ENV_MODE, raw
            ))),
        }
    }
}

/// Settings for one dnsync run
#[derive(Clone)]
pub struct DdnsConfig {
    /// Provider bearer token
    /// ⚠️ NEVER log this value
    pub api_token: String,

    /// Zone holding the record
    pub zone_id: String,

    /// Record to reconcile
    pub record_id: String,

    /// IP echo endpoint
    pub ip_echo_url: String,

    /// Provider API base URL
    pub api_base_url: String,

    /// Timeout applied to every outbound request
    pub http_timeout: Duration,

    /// TTL policy for updates
    pub ttl_policy: TtlPolicy,

    /// Live or dry-run
    pub mode: RunMode,

    /// Retry wrapper around each step
    pub retry: RetryPolicy,

    /// Log level name (trace, debug, info, warn, error)
    pub log_level: String,
}

// Custom Debug implementation that hides the API token
impl fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("record_id", &self.record_id)
            .field("ip_echo_url", &self.ip_echo_url)
            .field("api_base_url", &self.api_base_url)
            .field("http_timeout", &self.http_timeout)
            .field("ttl_policy", &self.ttl_policy)
            .field("mode", &self.mode)
            .field("retry", &self.retry)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl DdnsConfig {
    /// Create a configuration with defaults for everything but the three
    /// required identifiers
    pub fn new(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        record_id: impl Into<String>,
    ) -> Self {
        Self {
            api_token: api_token.into(),
            zone_id: zone_id.into(),
            record_id: record_id.into(),
            ip_echo_url: DEFAULT_IP_ECHO_URL.to_string(),
            api_base_url: DEFAULT_API_BASE.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            ttl_policy: TtlPolicy::default(),
            mode: RunMode::default(),
            retry: RetryPolicy::default(),
            log_level: "info".to_string(),
        }
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// Values are trimmed; a variable that is set but blank counts as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_token = get(ENV_API_TOKEN)
            .or_else(|| get(ENV_API_TOKEN_FALLBACK))
            .ok_or_else(|| {
                Error::config(format!(
                    "{} is required. Set it via: export {}=your_token",
                    ENV_API_TOKEN, ENV_API_TOKEN
                ))
            })?;
        let zone_id = get(ENV_ZONE_ID).ok_or_else(|| required(ENV_ZONE_ID))?;
        let record_id = get(ENV_RECORD_ID).ok_or_else(|| required(ENV_RECORD_ID))?;

        let mut config = Self::new(api_token, zone_id, record_id);

        if let Some(url) = get(ENV_IP_ECHO_URL) {
            config.ip_echo_url = url;
        }
        if let Some(url) = get(ENV_API_BASE) {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = get(ENV_HTTP_TIMEOUT_SECS) {
            config.http_timeout = Duration::from_secs(parse_number(ENV_HTTP_TIMEOUT_SECS, &raw)?);
        }
        if let Some(raw) = get(ENV_RECORD_TTL) {
            config.ttl_policy = TtlPolicy::parse(&raw)?;
        }
        if let Some(raw) = get(ENV_MODE) {
            config.mode = RunMode::parse(&raw)?;
        }
        if let Some(raw) = get(ENV_MAX_RETRIES) {
            config.retry.max_retries = parse_number(ENV_MAX_RETRIES, &raw)? as usize;
        }
        if let Some(raw) = get(ENV_RETRY_DELAY_SECS) {
            config.retry.base_delay = Duration::from_secs(parse_number(ENV_RETRY_DELAY_SECS, &raw)?);
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            config.log_level = level.to_lowercase();
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(required(ENV_API_TOKEN));
        }
        if self.zone_id.trim().is_empty() {
            return Err(required(ENV_ZONE_ID));
        }
        if self.record_id.trim().is_empty() {
            return Err(required(ENV_RECORD_ID));
        }

        validate_url(ENV_IP_ECHO_URL, &self.ip_echo_url)?;
        validate_url(ENV_API_BASE, &self.api_base_url)?;

        let timeout = self.http_timeout.as_secs();
        if !(1..=300).contains(&timeout) {
            return Err(Error::config(format!(
                "{} must be between 1 and 300 seconds. Got: {}",
                ENV_HTTP_TIMEOUT_SECS, timeout
            )));
        }

        if let TtlPolicy::Fixed(ttl) = self.ttl_policy
            && !(1..=86400).contains(&ttl)
        {
            return Err(Error::config(format!(
                "{} must be between 1 and 86400 seconds. Got: {}",
                ENV_RECORD_TTL, ttl
            )));
        }

        if self.retry.max_retries > 10 {
            return Err(Error::config(format!(
                "{} must be between 0 and 10. Got: {}",
                ENV_MAX_RETRIES, self.retry.max_retries
            )));
        }

        let delay = self.retry.base_delay.as_secs();
        if !(1..=300).contains(&delay) {
            return Err(Error::config(format!(
                "{} must be between 1 and 300 seconds. Got: {}",
                ENV_RETRY_DELAY_SECS, delay
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(Error::config(format!(
                    "{} '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                    ENV_LOG_LEVEL, self.log_level
                )));
            }
        }

        Ok(())
    }
}

fn required(key: &str) -> Error {
    Error::config(format!("{} is required and cannot be empty", key))
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| Error::config(format!("{} must be a non-negative integer. Got: {}", key, raw)))
}

fn validate_url(key: &str, url: &str) -> Result<()> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(Error::config(format!(
            "{} must use HTTP or HTTPS scheme. Got: {}",
            key, url
        )));
    }
    Ok(())
}
