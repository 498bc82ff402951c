// # dnsync
//
// One-shot dynamic DNS updater. Each invocation:
// 1. Reads configuration from environment variables (and `.env`, if present)
// 2. Resolves the public IP via an HTTP echo service
// 3. Fetches the managed Cloudflare record
// 4. Overwrites the record only if its content differs from the IP
//
// There is no loop; schedule the binary (cron, systemd timer) for
// continuous monitoring.
//
// ## Configuration
//
// ### Required
// - `API_TOKEN` (or `CLOUDFLARE_API_TOKEN`): Cloudflare API token
// - `ZONE_ID`: Zone ID
// - `RECORD_ID`: DNS record ID
//
// ### Optional
// - `IP_ECHO_URL`: Echo endpoint (default: https://checkip.amazonaws.com)
// - `CLOUDFLARE_API_BASE`: API base URL
// - `HTTP_TIMEOUT_SECS`: Per-request timeout (default: 10)
// - `RECORD_TTL`: TTL written on update, or `preserve` (default: 120)
// - `DDNS_MODE`: `live` or `dry-run` (default: live)
// - `DDNS_MAX_RETRIES`: Retries for transient failures (default: 0)
// - `DDNS_RETRY_DELAY_SECS`: Base backoff delay (default: 5)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export API_TOKEN=your_token
// export ZONE_ID=023e105f4ecef8ad9ca31a8372d0c353
// export RECORD_ID=372e67954025e0ba6aaa6d586b9e0b59
//
// dnsync
// ```

use anyhow::Context;
use dnsync_core::{DdnsConfig, Outcome, Reconciler};
use dnsync_ip_http::HttpIpSource;
use dnsync_provider_cloudflare::CloudflareProvider;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the possible ends of a run
///
/// - 0: Run completed (record updated, unchanged, or dry-run)
/// - 1: Configuration error, nothing was contacted
/// - 2: Runtime error (network, auth, not found, update rejected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DnsyncExitCode {
    /// Run completed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<DnsyncExitCode> for ExitCode {
    fn from(code: DnsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl DnsyncExitCode {
    fn for_result(result: &dnsync_core::Result<Outcome>) -> Self {
        match result {
            Ok(_) => DnsyncExitCode::Success,
            Err(e) if e.is_config() => DnsyncExitCode::ConfigError,
            Err(_) => DnsyncExitCode::RuntimeError,
        }
    }
}

fn main() -> ExitCode {
    // A missing .env is the normal case
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Failed to load .env file: {}", e);
        return DnsyncExitCode::ConfigError.into();
    }

    execute(|key| std::env::var(key).ok()).into()
}

/// Configure, then perform one run
///
/// Configuration is fully validated before the runtime or any client
/// exists, so a configuration failure never touches the network.
fn execute<F>(lookup: F) -> DnsyncExitCode
where
    F: Fn(&str) -> Option<String>,
{
    let config = match DdnsConfig::from_lookup(lookup) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            return DnsyncExitCode::ConfigError;
        }
    };

    if let Err(e) = init_tracing(&config.log_level) {
        eprintln!("{:#}", e);
        return DnsyncExitCode::ConfigError;
    }

    let rt = match build_runtime() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("{:#}", e);
            return DnsyncExitCode::RuntimeError;
        }
    };

    let result = rt.block_on(run(&config));
    match &result {
        Ok(outcome) => info!("{}", outcome),
        Err(e) => error!("Run failed: {}", e),
    }

    DnsyncExitCode::for_result(&result)
}

/// Install the global tracing subscriber
fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let level = match log_level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Single-threaded runtime; a run never does two things at once
fn build_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

/// Build the components from `config` and execute one run
async fn run(config: &DdnsConfig) -> dnsync_core::Result<Outcome> {
    let ip_source = HttpIpSource::from_config(config)?;
    let provider = CloudflareProvider::from_config(config)?;

    info!(
        "Reconciling record {} in zone {} [mode: {:?}]",
        config.record_id, config.zone_id, config.mode
    );

    Reconciler::new(Box::new(ip_source), Box::new(provider), config)
        .run()
        .await
}
