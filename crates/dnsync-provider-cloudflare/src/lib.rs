// # Cloudflare DNS Provider
//
// Reads and overwrites one Cloudflare DNS record identified by zone ID and
// record ID.
//
// ## Behavior
//
// - One HTTP request per trait call, bounded by an explicit timeout
// - Status codes and Cloudflare error codes are mapped onto the core error
//   kinds (auth, not-found, rejected, rate-limited, unavailable)
// - No retry, no caching, no comparison logic; the reconciler owns those
//
// ## Security Requirements
//
// - API token NEVER appears in logs, errors or `Debug` output
// - Provider MUST fail fast if token or identifiers are empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - DNS Record Details: GET `/zones/:zone_id/dns_records/:record_id`
// - Overwrite DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use dnsync_core::config::DdnsConfig;
use dnsync_core::traits::{DnsProvider, DnsRecord, RecordUpdate};
use dnsync_core::{Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// Cloudflare API base URL
pub use dnsync_core::config::DEFAULT_API_BASE as CLOUDFLARE_API_BASE;

/// Cloudflare error codes meaning "no such zone or record"
///
/// - 7003: could not route to the object, identifier invalid
/// - 81044: record does not exist
const NOT_FOUND_CODES: &[i64] = &[7003, 81044];

/// Longest slice of an unparseable error body echoed into an error message
const MAX_ERROR_BODY: usize = 200;

/// Standard Cloudflare v4 response envelope
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    code: i64,
    message: String,
}

/// Which call produced a response; decides how failures are classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Fetch,
    Update,
}

impl Operation {
    fn describe(&self) -> &'static str {
        match self {
            Operation::Fetch => "fetch",
            Operation::Update => "update",
        }
    }
}

/// Cloudflare DNS provider bound to one record
pub struct CloudflareProvider {
    /// Cloudflare API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Zone holding the record
    zone_id: String,

    /// Managed record
    record_id: String,

    /// API base URL (overridable for tests)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("record_id", &self.record_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `zone_id`: Zone identifier
    /// - `record_id`: Record identifier
    /// - `base_url`: API base, normally [`CLOUDFLARE_API_BASE`]
    /// - `timeout`: Applied to every request
    pub fn new(
        api_token: impl Into<String>,
        zone_id: impl Into<String>,
        record_id: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_token = api_token.into();
        let zone_id = zone_id.into();
        let record_id = record_id.into();

        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }
        if zone_id.is_empty() || record_id.is_empty() {
            return Err(Error::config("Cloudflare zone ID and record ID are required"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            zone_id,
            record_id,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create from the run configuration
    pub fn from_config(config: &DdnsConfig) -> Result<Self> {
        Self::new(
            config.api_token.clone(),
            config.zone_id.clone(),
            config.record_id.clone(),
            config.api_base_url.clone(),
            config.http_timeout,
        )
    }

    fn record_url(&self) -> String {
        format!(
            "{}/zones/{}/dns_records/{}",
            self.base_url, self.zone_id, self.record_id
        )
    }

    /// Send a request and turn the envelope into a record
    async fn execute(&self, request: reqwest::RequestBuilder, op: Operation) -> Result<DnsRecord> {
        let response = request
            .bearer_auth(&self.api_token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| {
                Error::network(format!(
                    "Cloudflare {} request failed: {}",
                    op.describe(),
                    e
                ))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            Error::network(format!(
                "Failed to read Cloudflare {} response: {}",
                op.describe(),
                e
            ))
        })?;

        match status.as_u16() {
            401 | 403 => {
                return Err(Error::auth(format!(
                    "Invalid API token or insufficient permissions. Status: {}",
                    status
                )));
            }
            404 => {
                return Err(Error::not_found(format!(
                    "zone {} / record {}",
                    self.zone_id, self.record_id
                )));
            }
            429 => {
                return Err(Error::rate_limited(format!(
                    "Rate limit exceeded. Please retry later. Status: {}",
                    status
                )));
            }
            500..=599 => {
                return Err(Error::unavailable(format!(
                    "Cloudflare server error (transient): {} - {}",
                    status,
                    truncate(&body)
                )));
            }
            _ => {}
        }

        let envelope = match serde_json::from_str::<ApiEnvelope<DnsRecord>>(&body) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(Error::provider(
                    "cloudflare",
                    format!("Failed to parse response: {}", e),
                ));
            }
            Err(_) => {
                return Err(self.classify(op, format!("{} - {}", status, truncate(&body)), false));
            }
        };

        if !status.is_success() || !envelope.success {
            let not_found = envelope
                .errors
                .iter()
                .any(|e| NOT_FOUND_CODES.contains(&e.code));
            let detail = if envelope.errors.is_empty() {
                format!("{} - no error details", status)
            } else {
                format_errors(&envelope.errors)
            };
            return Err(self.classify(op, detail, not_found));
        }

        envelope.result.ok_or_else(|| {
            Error::provider("cloudflare", "Invalid response format: result is missing")
        })
    }

    fn classify(&self, op: Operation, detail: String, not_found: bool) -> Error {
        if not_found {
            return Error::not_found(format!(
                "zone {} / record {}: {}",
                self.zone_id, self.record_id, detail
            ));
        }
        match op {
            Operation::Update => Error::update_rejected(detail),
            Operation::Fetch => {
                Error::provider("cloudflare", format!("Failed to get record: {}", detail))
            }
        }
    }
}

fn format_errors(errors: &[ApiMessage]) -> String {
    errors
        .iter()
        .map(|e| format!("code {}: {}", e.code, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// ```http
    /// GET /zones/:zone_id/dns_records/:record_id
    /// Authorization: Bearer <token>
    /// ```
    async fn get_record(&self) -> Result<DnsRecord> {
        tracing::debug!(
            "Fetching Cloudflare record {} in zone {}",
            self.record_id,
            self.zone_id
        );

        let request = self.client.get(self.record_url());
        self.execute(request, Operation::Fetch).await
    }

    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// Authorization: Bearer <token>
    ///
    /// {"type": "A", "name": "home.example.com", "content": "1.2.3.4", "ttl": 120, "proxied": false}
    /// ```
    async fn update_record(&self, update: &RecordUpdate) -> Result<DnsRecord> {
        tracing::debug!(
            "Overwriting Cloudflare record {} in zone {}",
            self.record_id,
            self.zone_id
        );

        let request = self.client.put(self.record_url()).json(update);
        let record = self.execute(request, Operation::Update).await?;

        tracing::info!(
            "DNS record updated successfully: {} -> {}",
            record.name,
            record.content
        );
        Ok(record)
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
