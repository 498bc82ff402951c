// # HTTP IP Source
//
// Resolves the caller's public IP by asking an external echo service
// (by default `https://checkip.amazonaws.com`) and reading the plain-text
// body.
//
// ## Behavior
//
// - One GET per `current()` call, bounded by an explicit timeout
// - 2xx status and a non-blank body are required
// - 429 and 5xx are reported as transient so a retry policy can repeat them
// - The body is trimmed but not parsed as an address
// - No caching, no polling, no fallback services

use async_trait::async_trait;
use dnsync_core::config::DdnsConfig;
use dnsync_core::traits::{IpSource, PublicIp};
use dnsync_core::{Error, Result};
use std::time::Duration;

/// Echo services answer with a handful of bytes; anything bigger is not an IP
const MAX_BODY_LEN: usize = 64;

/// HTTP echo-service IP source
#[derive(Debug)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: Echo endpoint (e.g., "https://checkip.amazonaws.com")
    /// - `timeout`: Applied to the whole request, connect included
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create from the run configuration
    pub fn from_config(config: &DdnsConfig) -> Result<Self> {
        Self::new(config.ip_echo_url.clone(), config.http_timeout)
    }

    /// The echo endpoint in use
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<PublicIp> {
        tracing::debug!("Resolving public IP via {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::network(format!("IP echo request failed: {}", e)))?;

        let status = response.status();
        match status.as_u16() {
            200..=299 => {}
            429 => {
                return Err(Error::rate_limited(format!(
                    "IP echo service {} is throttling requests. Status: {}",
                    self.url, status
                )));
            }
            500..=599 => {
                return Err(Error::unavailable(format!(
                    "IP echo service {} answered with HTTP {}",
                    self.url, status
                )));
            }
            _ => {
                return Err(Error::ip_resolution(format!(
                    "{} answered with HTTP {}",
                    self.url, status
                )));
            }
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read IP echo response: {}", e)))?;

        let ip = PublicIp::new(&body);
        if ip.is_empty() {
            return Err(Error::ip_resolution(format!(
                "{} returned an empty body",
                self.url
            )));
        }
        if ip.as_str().len() > MAX_BODY_LEN || ip.as_str().contains(char::is_whitespace) {
            return Err(Error::ip_resolution(format!(
                "{} returned something other than an address ({} bytes)",
                self.url,
                body.len()
            )));
        }

        Ok(ip)
    }

    fn source_name(&self) -> &str {
        &self.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dnsync_core::RetryPolicy;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source_for(server: &MockServer, timeout: Duration) -> HttpIpSource {
        HttpIpSource::new(format!("{}/ip", server.uri()), timeout).unwrap()
    }

    #[tokio::test]
    async fn test_trims_echo_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.9\n"))
            .expect(1)
            .mount(&server)
            .await;

        let source = source_for(&server, Duration::from_secs(5));
        let ip = source.current().await.unwrap();

        assert_eq!(ip.as_str(), "203.0.113.9");
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = source_for(&server, Duration::from_secs(5));
        let err = source.current().await.unwrap_err();

        assert!(matches!(err, Error::Unavailable(_)), "got {:?}", err);
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_client_error_status_is_resolution_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = source_for(&server, Duration::from_secs(5));
        let err = source.current().await.unwrap_err();

        assert!(matches!(err, Error::IpResolution(_)), "got {:?}", err);
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_throttled_echo_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let source = source_for(&server, Duration::from_secs(5));
        let err = source.current().await.unwrap_err();

        assert!(matches!(err, Error::RateLimited(_)), "got {:?}", err);
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_retry_recovers_from_echo_outage() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.9\n"))
            .expect(1)
            .mount(&server)
            .await;

        let source = source_for(&server, Duration::from_secs(5));
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let ip = policy
            .run("IP resolution", || source.current())
            .await
            .unwrap();

        assert_eq!(ip.as_str(), "203.0.113.9");
    }

    #[tokio::test]
    async fn test_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(200).set_body_string(" \n"))
            .mount(&server)
            .await;

        let source = source_for(&server, Duration::from_secs(5));
        assert!(matches!(
            source.current().await,
            Err(Error::IpResolution(_))
        ));
    }

    #[tokio::test]
    async fn test_html_body_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body>Service temporarily unavailable</body></html>"),
            )
            .mount(&server)
            .await;

        let source = source_for(&server, Duration::from_secs(5));
        assert!(matches!(
            source.current().await,
            Err(Error::IpResolution(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("203.0.113.9")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let source = source_for(&server, Duration::from_millis(200));
        let err = source.current().await.unwrap_err();

        assert!(matches!(err, Error::Network(_)), "got {:?}", err);
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_truncated_body_is_network_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            // Promise 64 bytes, send 5, hang up
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 64\r\n\r\n203.0")
                .await
                .unwrap();
        });

        let source =
            HttpIpSource::new(format!("http://{}/ip", addr), Duration::from_secs(5)).unwrap();
        let err = source.current().await.unwrap_err();

        assert!(matches!(err, Error::Network(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Nothing listens on port 9 of localhost in the test environment.
        let source = HttpIpSource::new("http://127.0.0.1:9/ip", Duration::from_secs(2)).unwrap();
        assert!(matches!(source.current().await, Err(Error::Network(_))));
    }

    #[test]
    fn test_from_config_uses_echo_url() {
        let config = DdnsConfig::new("token", "zone", "record");
        let source = HttpIpSource::from_config(&config).unwrap();
        assert_eq!(source.url(), "https://checkip.amazonaws.com");
        assert_eq!(source.source_name(), "https://checkip.amazonaws.com");
    }
}
