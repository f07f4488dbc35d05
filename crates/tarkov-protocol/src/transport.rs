//! Transport collaborator
//!
//! Everything above this module talks to the backend through the
//! [`Transport`] trait: one POST with ordered headers and a JSON body,
//! answered by a status code and the raw (still compressed) body. The
//! reqwest-backed [`HttpTransport`] is the production implementation;
//! tests substitute scripted in-memory transports.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, ClientBuilder, StatusCode};
use std::sync::Once;
use tracing::trace;

use crate::config::HttpConfig;
use crate::error::{ProtocolError, Result};
use crate::retry::RetryPolicy;

static CRYPTO_PROVIDER: Once = Once::new();

/// Install the ring crypto provider for rustls exactly once per process
pub fn ensure_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        // Another component may already have installed a provider
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Outbound POST request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub url: String,
    /// Header name/value pairs, sent in order
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TransportRequest {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first header named `name` (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response as received from the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Performs a single HTTP POST round trip
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse> {
        (**self).post(request).await
    }
}

/// reqwest-backed transport
///
/// Content decoding is not enabled on the client, so zlib bodies reach the
/// envelope codec exactly as the backend sent them.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    retry_policy: RetryPolicy,
}

impl HttpTransport {
    /// Transport with default HTTP settings and no retries
    pub fn new() -> Result<Self> {
        Self::with_config(&HttpConfig::default(), RetryPolicy::default())
    }

    pub fn with_config(config: &HttpConfig, retry_policy: RetryPolicy) -> Result<Self> {
        ensure_crypto_provider();

        let client = ClientBuilder::new()
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .tcp_nodelay(true)
            .build()?;

        Ok(Self {
            client,
            retry_policy,
        })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    async fn send_once(&self, request: &TransportRequest) -> Result<TransportResponse> {
        let mut builder = self
            .client
            .post(&request.url)
            .body(request.body.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_connect() {
                ProtocolError::Connect(e.to_string())
            } else {
                ProtocolError::Http(e)
            }
        })?;

        let status = response.status();
        let body = response.bytes().await?;
        trace!(url = %request.url, %status, bytes = body.len(), "received response");

        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse> {
        self.retry_policy
            .execute(|| self.send_once(&request))
            .await
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_request_builder_keeps_header_order() {
        let request = TransportRequest::new("http://localhost/x", "{}")
            .header("Content-Type", "application/json")
            .header("Cookie", "PHPSESSID=abc")
            .header("GClient-RequestId", "1");

        let names: Vec<_> = request.headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, ["Content-Type", "Cookie", "GClient-RequestId"]);
        assert_eq!(request.header_value("cookie"), Some("PHPSESSID=abc"));
        assert_eq!(request.header_value("Authorization"), None);
    }

    #[tokio::test]
    async fn test_post_sends_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/client/game/keepalive"))
            .and(header("Cookie", "PHPSESSID=abc"))
            .and(body_string("{\"crc\":0}"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x78, 0x9c, 0x03, 0x00]))
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::new().expect("Operation should succeed");
        let response = transport
            .post(
                TransportRequest::new(format!("{}/client/game/keepalive", server.uri()), "{\"crc\":0}")
                    .header("Cookie", "PHPSESSID=abc"),
            )
            .await
            .expect("Operation should succeed");

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body.as_ref(), &[0x78, 0x9c, 0x03, 0x00]);
    }

    #[tokio::test]
    async fn test_non_200_is_returned_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let transport = HttpTransport::new().expect("Operation should succeed");
        let response = transport
            .post(TransportRequest::new(server.uri(), "{}"))
            .await
            .expect("Operation should succeed");

        assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_compressed_body_is_not_decoded() {
        let payload = crate::envelope::encode(&crate::envelope::ResponseEnvelope::ok(
            serde_json::json!({"ok": true}),
        ))
        .expect("Operation should succeed");

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Encoding", "deflate")
                    .set_body_bytes(payload.clone()),
            )
            .mount(&server)
            .await;

        let transport = HttpTransport::new().expect("Operation should succeed");
        let response = transport
            .post(TransportRequest::new(server.uri(), "{}"))
            .await
            .expect("Operation should succeed");

        assert_eq!(response.body.as_ref(), payload.as_slice());
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_connect() {
        // Bind then drop a listener to get a port nothing listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Operation should succeed");
            listener.local_addr().expect("Operation should succeed").port()
        };

        let transport = HttpTransport::new().expect("Operation should succeed");
        let result = transport
            .post(TransportRequest::new(format!("http://127.0.0.1:{port}/"), "{}"))
            .await;

        assert!(matches!(result, Err(ProtocolError::Connect(_))));
    }
}
