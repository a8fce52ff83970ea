//! HTTP transport layer.
//!
//! A [`Transport`] sends one fully built [`FetchRequest`] and resolves to a
//! buffered [`Response`]. It does not interpret the status code: error
//! statuses are still `Ok` responses at this level.
//!
//! [`HyperTransport`] is the default. Tests and embedders can substitute any
//! implementation, most simply a closure wrapped with [`transport_fn`].
//!
//! # Feature Flags
//!
//! TLS support requires enabling the appropriate features:
//!
//! - `tls` (default) - Enables `tls-ring` + `tls-native-roots` for convenience
//! - `tls-ring` / `tls-aws-lc` - Crypto providers
//! - `tls-native-roots` / `tls-webpki-roots` - Root certificates
//!
//! # Example
//!
//! ```
//! use http::StatusCode;
//! use interfetch::transport::transport_fn;
//! use interfetch::{ApiError, Response};
//! use serde_json::json;
//!
//! let transport = transport_fn(|request| async move {
//!     Ok::<_, ApiError>(Response::from_json(StatusCode::OK, &json!({"url": request.url}))?)
//! });
//! ```

mod connector;
mod hyper;

use std::future::Future;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use interfetch_core::{Body, Response, redacted};

use crate::error::ApiError;
use crate::interceptor::BoxFuture;
use crate::options::RequestOptions;

pub use connector::{build_https_connector, has_tls_support};

#[cfg(any(feature = "tls-native-roots", feature = "tls-webpki-roots"))]
pub use connector::default_tls_config;

pub use hyper::{HyperTransport, HyperTransportBuilder};

// Re-export the rustls type used to customize TLS
pub use rustls::ClientConfig as TlsClientConfig;

/// A request ready for the wire.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    /// Absolute URL, query string included.
    pub url: String,
    /// HTTP method.
    pub method: Method,
    /// Final request headers.
    pub headers: HeaderMap,
    /// Encoded body, if any.
    pub body: Option<Bytes>,
}

impl FetchRequest {
    /// Build the wire request from final options: resolve the URL and
    /// encode the body.
    ///
    /// Credential headers an interceptor added are marked sensitive.
    pub fn from_options(options: &RequestOptions) -> Result<Self, ApiError> {
        Ok(Self {
            url: options.resolved_url()?,
            method: options.method.clone(),
            headers: redacted(&options.headers),
            body: options.body.as_ref().map(Body::encode).transpose()?,
        })
    }

    /// Convert into an `http::Request`.
    ///
    /// Fails with [`ApiError::InvalidRequest`] if the URL does not parse.
    pub fn into_http(self) -> Result<http::Request<Bytes>, ApiError> {
        let uri: Uri = self
            .url
            .parse()
            .map_err(|e| ApiError::InvalidRequest(format!("invalid url {:?}: {e}", self.url)))?;

        let mut request = http::Request::new(self.body.unwrap_or_default());
        *request.method_mut() = self.method;
        *request.uri_mut() = uri;
        *request.headers_mut() = self.headers;
        Ok(request)
    }
}

/// Sends requests and buffers responses.
pub trait Transport: Send + Sync {
    /// Send `request`, resolving to the response whatever its status.
    ///
    /// Failures before a response is received map to [`ApiError::Network`].
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<Response, ApiError>>;
}

/// A transport built from a closure.
///
/// Created by [`transport_fn`].
#[derive(Clone)]
pub struct FnTransport<F> {
    func: F,
}

/// Build a transport from an async closure.
pub fn transport_fn<F, Fut>(func: F) -> FnTransport<F>
where
    F: Fn(FetchRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, ApiError>> + Send + 'static,
{
    FnTransport { func }
}

impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(FetchRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, ApiError>> + Send + 'static,
{
    fn fetch(&self, request: FetchRequest) -> BoxFuture<'_, Result<Response, ApiError>> {
        Box::pin((self.func)(request))
    }
}

impl<F> std::fmt::Debug for FnTransport<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTransport").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderValue, StatusCode};
    use http::header::{AUTHORIZATION, CONTENT_TYPE};
    use serde_json::json;

    #[test]
    fn test_from_options() {
        let mut options = RequestOptions {
            url: "/things".into(),
            api_url: "https://api.example.com".into(),
            method: Method::POST,
            body: Some(json!({"name": "lamp"}).into()),
            ..Default::default()
        };
        options.params.insert("perPage".into(), "10".into());

        let request = FetchRequest::from_options(&options).unwrap();
        assert_eq!(request.url, "https://api.example.com/things?perPage=10");
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.headers[CONTENT_TYPE], "application/json");
        assert_eq!(request.body.unwrap(), Bytes::from_static(br#"{"name":"lamp"}"#));
    }

    #[test]
    fn test_from_options_marks_credentials() {
        let mut options = RequestOptions {
            url: "https://api.example.com/things".into(),
            ..Default::default()
        };
        options
            .headers
            .insert(AUTHORIZATION, HeaderValue::from_static("Bearer s3cr3t"));

        let request = FetchRequest::from_options(&options).unwrap();
        assert!(request.headers[AUTHORIZATION].is_sensitive());
        assert!(!format!("{request:?}").contains("s3cr3t"));
    }

    #[test]
    fn test_from_options_without_body() {
        let options = RequestOptions {
            url: "https://api.example.com/things".into(),
            ..Default::default()
        };
        let request = FetchRequest::from_options(&options).unwrap();
        assert!(request.body.is_none());
        assert_eq!(request.method, Method::GET);
    }

    #[test]
    fn test_into_http() {
        let request = FetchRequest {
            url: "http://localhost:3000/things".into(),
            method: Method::PUT,
            headers: HeaderMap::new(),
            body: Some(Bytes::from_static(b"{}")),
        };
        let request = request.into_http().unwrap();
        assert_eq!(request.method(), Method::PUT);
        assert_eq!(request.uri().path(), "/things");
        assert_eq!(request.body(), &Bytes::from_static(b"{}"));
    }

    #[test]
    fn test_into_http_invalid_url() {
        let request = FetchRequest {
            url: "not a url".into(),
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        };
        let err = request.into_http().unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_transport_fn() {
        let transport = transport_fn(|request: FetchRequest| async move {
            Ok::<_, ApiError>(Response::from_json(
                StatusCode::CREATED,
                &json!({"url": request.url}),
            )?)
        });

        let request = FetchRequest {
            url: "/echo".into(),
            method: Method::GET,
            headers: HeaderMap::new(),
            body: None,
        };
        let response = transport.fetch(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.json().unwrap(), json!({"url": "/echo"}));
    }
}
