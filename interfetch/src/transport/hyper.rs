//! Hyper-based HTTP transport.
//!
//! This module provides [`HyperTransport`], the default transport, built on
//! hyper_util's legacy client.

use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::{TokioExecutor, TokioTimer};
use interfetch_core::Response;
use rustls::ClientConfig;
use tower_service::Service;

use super::connector::build_https_connector;
use super::{FetchRequest, Transport};
use crate::builder::ClientBuildError;
use crate::error::ApiError;
use crate::interceptor::BoxFuture;

type HyperClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// HTTP transport using hyper_util's legacy client.
///
/// Supports HTTP/1.1 and HTTP/2 with TLS, connection pooling and protocol
/// negotiation via ALPN. Response bodies are buffered in full.
///
/// The transport is also a [`tower_service::Service`] over buffered
/// requests, so it can sit under tower middleware.
#[derive(Clone)]
pub struct HyperTransport {
    client: HyperClient,
    http2_only: bool,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("http2_only", &self.http2_only)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Create a new transport builder.
    pub fn builder() -> HyperTransportBuilder {
        HyperTransportBuilder::new()
    }

    /// Create a new transport with default settings.
    pub fn new() -> Result<Self, ClientBuildError> {
        Self::builder().build()
    }

    /// Send a buffered request and buffer the whole response.
    pub async fn send(
        &self,
        request: http::Request<Bytes>,
    ) -> Result<http::Response<Bytes>, ApiError> {
        send(&self.client, request).await
    }

    /// Whether this transport is configured for HTTP/2 only.
    pub fn is_http2_only(&self) -> bool {
        self.http2_only
    }
}

async fn send(
    client: &HyperClient,
    request: http::Request<Bytes>,
) -> Result<http::Response<Bytes>, ApiError> {
    let request = request.map(Full::new);

    let response = client
        .request(request)
        .await
        .map_err(|e| ApiError::Network(format!("request failed: {e}")))?;

    let (parts, body) = response.into_parts();
    let body = body
        .collect()
        .await
        .map_err(|e| ApiError::Network(format!("failed to read response body: {e}")))?
        .to_bytes();

    Ok(http::Response::from_parts(parts, body))
}

impl Transport for HyperTransport {
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<Response, ApiError>> {
        Box::pin(async move {
            let request = request.into_http()?;
            let response = self.send(request).await?;
            Ok(Response::from(response))
        })
    }
}

/// Builder for [`HyperTransport`].
///
/// # Example
///
/// ```
/// use interfetch::transport::HyperTransportBuilder;
/// use std::time::Duration;
///
/// let builder = HyperTransportBuilder::new()
///     .pool_idle_timeout(Duration::from_secs(60))
///     .pool_max_idle_per_host(8);
/// ```
pub struct HyperTransportBuilder {
    /// Custom TLS configuration.
    tls_config: Option<ClientConfig>,
    /// Force HTTP/2 only (h2c, or servers known to speak HTTP/2).
    http2_only: bool,
    /// Connection pool idle timeout.
    pool_idle_timeout: Option<Duration>,
    /// Maximum idle connections per host.
    pool_max_idle_per_host: usize,
}

impl Default for HyperTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransportBuilder {
    /// Create a new transport builder with default settings.
    pub fn new() -> Self {
        Self {
            tls_config: None,
            http2_only: false,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }

    /// Set a custom TLS configuration.
    ///
    /// Use this for custom root certificates or client certificates.
    pub fn tls_config(mut self, config: ClientConfig) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Enable HTTP/2 only mode.
    pub fn http2_only(mut self, enabled: bool) -> Self {
        self.http2_only = enabled;
        self
    }

    /// Set the connection pool idle timeout.
    ///
    /// Default: 90 seconds.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Disable the connection pool idle timeout.
    pub fn pool_idle_timeout_none(mut self) -> Self {
        self.pool_idle_timeout = None;
        self
    }

    /// Set the maximum number of idle connections per host.
    ///
    /// Default: 32.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Build the transport.
    pub fn build(self) -> Result<HyperTransport, ClientBuildError> {
        let https_connector = build_https_connector(self.tls_config)?;

        let mut builder = Client::builder(TokioExecutor::new());

        // Required for pool_idle_timeout to take effect.
        builder.pool_timer(TokioTimer::new());

        if let Some(timeout) = self.pool_idle_timeout {
            builder.pool_idle_timeout(timeout);
        }
        builder.pool_max_idle_per_host(self.pool_max_idle_per_host);

        if self.http2_only {
            builder.http2_only(true);
        }

        let client = builder.build(https_connector);

        #[cfg(feature = "tracing")]
        tracing::debug!(http2_only = self.http2_only, "built hyper transport");

        Ok(HyperTransport {
            client,
            http2_only: self.http2_only,
        })
    }
}

impl std::fmt::Debug for HyperTransportBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransportBuilder")
            .field("tls_config", &self.tls_config.is_some())
            .field("http2_only", &self.http2_only)
            .field("pool_idle_timeout", &self.pool_idle_timeout)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .finish()
    }
}

impl Service<http::Request<Bytes>> for HyperTransport {
    type Response = http::Response<Bytes>;
    type Error = ApiError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // hyper_util legacy::Client is always ready
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<Bytes>) -> Self::Future {
        let client = self.client.clone();
        Box::pin(async move { send(&client, req).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = HyperTransportBuilder::new();
        assert!(!builder.http2_only);
        assert_eq!(builder.pool_max_idle_per_host, 32);
        assert_eq!(builder.pool_idle_timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_builder_pool_settings() {
        let builder = HyperTransportBuilder::new()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(10);
        assert_eq!(builder.pool_idle_timeout, Some(Duration::from_secs(60)));
        assert_eq!(builder.pool_max_idle_per_host, 10);

        let builder = builder.pool_idle_timeout_none();
        assert!(builder.pool_idle_timeout.is_none());
    }

    #[cfg(all(feature = "tls-ring", feature = "tls-native-roots"))]
    #[test]
    fn test_build_transport_http2_only() {
        let transport = HyperTransportBuilder::new().http2_only(true).build().unwrap();
        assert!(transport.is_http2_only());
    }

    #[cfg(all(feature = "tls-ring", feature = "tls-native-roots"))]
    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let transport = HyperTransport::new().unwrap();
        let request = FetchRequest {
            url: "http://127.0.0.1:9/".into(),
            method: http::Method::GET,
            headers: http::HeaderMap::new(),
            body: None,
        };
        let err = transport.fetch(request).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
