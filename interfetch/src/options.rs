//! Call options and option merging.
//!
//! [`CallOptions`] is a partial configuration layer. Two layers exist per
//! call: the process-wide settings and the options passed to the call. They
//! are merged by [`merge`] into one [`RequestOptions`], the concrete request
//! descriptor that request interceptors receive.
//!
//! Merge rules:
//! - headers merge per key: defaults, then settings, then call options;
//! - every other field is last-writer-wins (call options over settings);
//! - an `api_key` sets the `authorization` header unless one is present;
//! - an opaque body supplies its own `content-type` unless one was set
//!   explicitly, and never inherits the JSON default.

use std::sync::Arc;

use bytes::Bytes;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use indexmap::IndexMap;
use interfetch_core::{Body, default_headers, mark_sensitive, merge_headers, redacted, resolve_url};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::interceptor::Interceptor;

/// A partial set of request options.
///
/// Every field is optional; unset fields fall through to the next layer or
/// to the built-in defaults (`GET`, empty URL, `content-type:
/// application/json`, parsed-body mode).
///
/// # Example
///
/// ```
/// use interfetch::CallOptions;
/// use serde_json::json;
///
/// let options = CallOptions::new()
///     .post("/things")
///     .header("x-request-id", "abc-123")
///     .param("project", "p1")
///     .json(json!({"name": "lamp"}));
/// ```
#[derive(Clone, Default)]
pub struct CallOptions {
    pub(crate) url: Option<String>,
    pub(crate) method: Option<Method>,
    pub(crate) headers: Option<HeaderMap>,
    pub(crate) body: Option<Body>,
    pub(crate) params: Option<IndexMap<String, String>>,
    pub(crate) api_url: Option<String>,
    pub(crate) api_key: Option<String>,
    pub(crate) interceptors: Option<Vec<Arc<dyn Interceptor>>>,
    pub(crate) full_response: Option<bool>,
    pub(crate) cancel_token: Option<CancellationToken>,
}

impl CallOptions {
    /// Create empty call options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request path, appended verbatim to the API URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Shorthand for `GET` on `url`.
    pub fn get(self, url: impl Into<String>) -> Self {
        self.method(Method::GET).url(url)
    }

    /// Shorthand for `POST` on `url`.
    pub fn post(self, url: impl Into<String>) -> Self {
        self.method(Method::POST).url(url)
    }

    /// Shorthand for `PUT` on `url`.
    pub fn put(self, url: impl Into<String>) -> Self {
        self.method(Method::PUT).url(url)
    }

    /// Shorthand for `DELETE` on `url`.
    pub fn delete(self, url: impl Into<String>) -> Self {
        self.method(Method::DELETE).url(url)
    }

    /// Add a header for this layer.
    ///
    /// # Panics
    ///
    /// Panics if the header name or value is invalid.
    pub fn header<K, V>(mut self, name: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        K::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        V::Error: std::fmt::Debug,
    {
        let name = name.try_into().expect("invalid header name");
        let value = value.try_into().expect("invalid header value");
        let headers = self.headers_mut();
        headers.insert(name, value);
        mark_sensitive(headers);
        self
    }

    /// Try to add a header for this layer.
    ///
    /// Returns `None` if the header name or value is invalid.
    pub fn try_header<K, V>(mut self, name: K, value: V) -> Option<Self>
    where
        K: TryInto<HeaderName>,
        V: TryInto<HeaderValue>,
    {
        let name = name.try_into().ok()?;
        let value = value.try_into().ok()?;
        let headers = self.headers_mut();
        headers.insert(name, value);
        mark_sensitive(headers);
        Some(self)
    }

    /// Set all headers for this layer, replacing any set before.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Mutable access to this layer's headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.headers.get_or_insert_with(HeaderMap::new)
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a JSON request body.
    pub fn json(self, value: Value) -> Self {
        self.body(Body::Json(value))
    }

    /// Serialize `value` into a JSON request body.
    pub fn try_json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, ApiError> {
        Ok(self.body(Body::json(value)?))
    }

    /// Set an opaque body carrying its own media type (e.g. a multipart form).
    pub fn form(self, data: impl Into<Bytes>, content_type: HeaderValue) -> Self {
        self.body(Body::with_content_type(data, content_type))
    }

    /// Add one query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(IndexMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set all query parameters, replacing any set before.
    pub fn params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params = Some(
            params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Set the base API URL.
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Set the API key, sent as the `authorization` header unless one is set.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Append an interceptor to this layer's chain.
    pub fn interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors
            .get_or_insert_with(Vec::new)
            .push(Arc::new(interceptor));
        self
    }

    /// Set this layer's interceptor chain, replacing any set before.
    pub fn interceptors(mut self, interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        self.interceptors = Some(interceptors);
        self
    }

    /// Resolve with the whole response instead of its parsed body.
    pub fn full_response(mut self, enabled: bool) -> Self {
        self.full_response = Some(enabled);
        self
    }

    /// Tie the call to an external cancellation token.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// Get this layer's headers, if any were set.
    pub fn get_headers(&self) -> Option<&HeaderMap> {
        self.headers.as_ref()
    }

    /// Get this layer's API URL, if set.
    pub fn get_api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }

    /// Get this layer's API key, if set.
    pub fn get_api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Shallow-merge `patch` into `self`: every field set in `patch` replaces
    /// the field in `self`.
    pub fn overlay(&mut self, patch: CallOptions) {
        let CallOptions {
            url,
            method,
            headers,
            body,
            params,
            api_url,
            api_key,
            interceptors,
            full_response,
            cancel_token,
        } = patch;

        if url.is_some() {
            self.url = url;
        }
        if method.is_some() {
            self.method = method;
        }
        if headers.is_some() {
            self.headers = headers;
        }
        if body.is_some() {
            self.body = body;
        }
        if params.is_some() {
            self.params = params;
        }
        if api_url.is_some() {
            self.api_url = api_url;
        }
        if api_key.is_some() {
            self.api_key = api_key;
        }
        if interceptors.is_some() {
            self.interceptors = interceptors;
        }
        if full_response.is_some() {
            self.full_response = full_response;
        }
        if cancel_token.is_some() {
            self.cancel_token = cancel_token;
        }
    }
}

impl std::fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallOptions")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers.as_ref().map(redacted))
            .field("body", &self.body)
            .field("params", &self.params)
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("interceptors", &self.interceptors.as_ref().map(Vec::len))
            .field("full_response", &self.full_response)
            .field("cancel_token", &self.cancel_token.is_some())
            .finish()
    }
}

/// The merged request descriptor.
///
/// Request interceptors receive this value and may mutate it in place or
/// replace it wholesale.
#[derive(Clone)]
pub struct RequestOptions {
    /// Request path, appended verbatim to `api_url`.
    pub url: String,
    /// HTTP method.
    pub method: Method,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Option<Body>,
    /// Query parameters, in insertion order.
    pub params: IndexMap<String, String>,
    /// Base API URL.
    pub api_url: String,
    /// API key in effect for this call.
    pub api_key: Option<String>,
    /// The interceptor chain of this call.
    pub interceptors: Vec<Arc<dyn Interceptor>>,
    /// Resolve with the whole response instead of its parsed body.
    pub full_response: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: Method::GET,
            headers: default_headers(),
            body: None,
            params: IndexMap::new(),
            api_url: String::new(),
            api_key: None,
            interceptors: Vec::new(),
            full_response: false,
        }
    }
}

impl RequestOptions {
    /// The final request URL: `api_url + url`, plus the query string.
    pub fn resolved_url(&self) -> Result<String, ApiError> {
        Ok(resolve_url(&self.api_url, &self.url, &self.params)?)
    }

    /// Mutable access to a JSON body.
    pub fn json_body_mut(&mut self) -> Option<&mut Value> {
        self.body.as_mut().and_then(Body::as_json_mut)
    }
}

impl std::fmt::Debug for RequestOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestOptions")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &redacted(&self.headers))
            .field("body", &self.body)
            .field("params", &self.params)
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("interceptors", &self.interceptors.len())
            .field("full_response", &self.full_response)
            .finish()
    }
}

/// Merge the settings layer and the call layer into a request descriptor.
///
/// Neither input is modified.
pub fn merge(settings: &CallOptions, call: &CallOptions) -> Result<RequestOptions, ApiError> {
    let layers: Vec<&HeaderMap> = [settings.headers.as_ref(), call.headers.as_ref()]
        .into_iter()
        .flatten()
        .collect();
    let explicit_content_type = layers.iter().any(|layer| layer.contains_key(CONTENT_TYPE));
    let mut headers = merge_headers(layers);

    let api_key = pick(&call.api_key, &settings.api_key);
    if let Some(key) = &api_key {
        if !headers.contains_key(AUTHORIZATION) {
            let mut value = HeaderValue::from_str(key)
                .map_err(|e| ApiError::InvalidRequest(format!("invalid api key: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
    }

    let body = pick(&call.body, &settings.body);
    if let Some(Body::Raw { content_type, .. }) = &body {
        if !explicit_content_type {
            match content_type {
                Some(ct) => {
                    headers.insert(CONTENT_TYPE, ct.clone());
                }
                None => {
                    headers.remove(CONTENT_TYPE);
                }
            }
        }
    }

    Ok(RequestOptions {
        url: pick(&call.url, &settings.url).unwrap_or_default(),
        method: pick(&call.method, &settings.method).unwrap_or(Method::GET),
        headers,
        body,
        params: pick(&call.params, &settings.params).unwrap_or_default(),
        api_url: pick(&call.api_url, &settings.api_url).unwrap_or_default(),
        api_key,
        interceptors: pick(&call.interceptors, &settings.interceptors).unwrap_or_default(),
        full_response: pick(&call.full_response, &settings.full_response).unwrap_or(false),
    })
}

fn pick<T: Clone>(call: &Option<T>, settings: &Option<T>) -> Option<T> {
    call.as_ref().or(settings.as_ref()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::request_fn;
    use interfetch_core::JSON_CONTENT_TYPE;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let merged = merge(&CallOptions::new(), &CallOptions::new()).unwrap();
        assert_eq!(merged.method, Method::GET);
        assert_eq!(merged.url, "");
        assert_eq!(merged.api_url, "");
        assert!(!merged.full_response);
        assert!(merged.body.is_none());
        assert!(merged.interceptors.is_empty());
        assert_eq!(merged.headers.get(CONTENT_TYPE).unwrap(), JSON_CONTENT_TYPE);
    }

    #[test]
    fn test_header_precedence_per_key() {
        let settings = CallOptions::new()
            .header("x-shared", "global")
            .header("x-global-only", "global")
            .header("content-type", "text/plain");
        let call = CallOptions::new()
            .header("x-shared", "call")
            .header("x-call-only", "call");

        let merged = merge(&settings, &call).unwrap();
        assert_eq!(merged.headers.get("x-shared").unwrap(), "call");
        assert_eq!(merged.headers.get("x-global-only").unwrap(), "global");
        assert_eq!(merged.headers.get("x-call-only").unwrap(), "call");
        assert_eq!(merged.headers.get(CONTENT_TYPE).unwrap(), "text/plain");
    }

    #[test]
    fn test_call_overrides_default_content_type() {
        let call = CallOptions::new().header("content-type", "application/xml");
        let merged = merge(&CallOptions::new(), &call).unwrap();
        assert_eq!(merged.headers.get(CONTENT_TYPE).unwrap(), "application/xml");
    }

    #[test]
    fn test_api_key_sets_authorization() {
        let call = CallOptions::new().api_key("secret");
        let merged = merge(&CallOptions::new(), &call).unwrap();
        assert_eq!(merged.headers.get(AUTHORIZATION).unwrap(), "secret");
    }

    #[test]
    fn test_api_key_does_not_override_authorization() {
        let settings = CallOptions::new().header("authorization", "from-settings");
        let call = CallOptions::new().api_key("secret");
        let merged = merge(&settings, &call).unwrap();
        assert_eq!(merged.headers.get(AUTHORIZATION).unwrap(), "from-settings");
    }

    #[test]
    fn test_settings_api_key_applies() {
        let settings = CallOptions::new().api_key("global-key");
        let merged = merge(&settings, &CallOptions::new()).unwrap();
        assert_eq!(merged.headers.get(AUTHORIZATION).unwrap(), "global-key");
        assert_eq!(merged.api_key.as_deref(), Some("global-key"));
    }

    #[test]
    fn test_invalid_api_key() {
        let call = CallOptions::new().api_key("bad\nkey");
        let err = merge(&CallOptions::new(), &call).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[test]
    fn test_last_writer_wins() {
        let settings = CallOptions::new()
            .api_url("https://global.example.com")
            .url("/global")
            .full_response(true)
            .param("a", "1");
        let call = CallOptions::new().api_url("https://call.example.com");

        let merged = merge(&settings, &call).unwrap();
        assert_eq!(merged.api_url, "https://call.example.com");
        assert_eq!(merged.url, "/global");
        assert!(merged.full_response);
        assert_eq!(merged.params.get("a").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_call_interceptors_replace_settings() {
        let settings = CallOptions::new()
            .interceptor(request_fn(|_, _| Ok(())))
            .interceptor(request_fn(|_, _| Ok(())));
        let call = CallOptions::new().interceptor(request_fn(|_, _| Ok(())));

        assert_eq!(merge(&settings, &call).unwrap().interceptors.len(), 1);
        assert_eq!(
            merge(&settings, &CallOptions::new()).unwrap().interceptors.len(),
            2
        );
    }

    #[test]
    fn test_raw_body_passes_through() {
        let ct = HeaderValue::from_static("multipart/form-data; boundary=xyz");
        let call = CallOptions::new().form(Bytes::from_static(b"--xyz--"), ct.clone());
        let merged = merge(&CallOptions::new(), &call).unwrap();

        assert_eq!(merged.headers.get(CONTENT_TYPE), Some(&ct));
        assert_eq!(
            merged.body,
            Some(Body::with_content_type(Bytes::from_static(b"--xyz--"), ct))
        );
    }

    #[test]
    fn test_raw_body_without_type_drops_json_default() {
        let call = CallOptions::new().body(Body::raw("bytes"));
        let merged = merge(&CallOptions::new(), &call).unwrap();
        assert!(merged.headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_raw_body_keeps_explicit_content_type() {
        let call = CallOptions::new()
            .header("content-type", "application/octet-stream")
            .form("data", HeaderValue::from_static("multipart/form-data; boundary=b"));
        let merged = merge(&CallOptions::new(), &call).unwrap();
        assert_eq!(
            merged.headers.get(CONTENT_TYPE).unwrap(),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_merge_does_not_mutate_inputs() {
        let settings = CallOptions::new().header("x-a", "1");
        let call = CallOptions::new().api_key("k").json(json!({"count": 0}));
        let mut merged = merge(&settings, &call).unwrap();
        merged.json_body_mut().unwrap()["count"] = json!(9);
        merged.headers.insert("x-a", HeaderValue::from_static("2"));

        assert_eq!(settings.get_headers().unwrap().get("x-a").unwrap(), "1");
        assert!(!settings.get_headers().unwrap().contains_key(AUTHORIZATION));
        assert_eq!(call.body, Some(Body::Json(json!({"count": 0}))));
    }

    #[test]
    fn test_overlay_is_shallow() {
        let mut base = CallOptions::new()
            .api_url("https://a.example.com")
            .header("x-a", "1")
            .header("x-b", "2");
        base.overlay(CallOptions::new().header("x-c", "3"));

        let headers = base.get_headers().unwrap();
        assert!(headers.get("x-a").is_none());
        assert_eq!(headers.get("x-c").unwrap(), "3");
        assert_eq!(base.get_api_url(), Some("https://a.example.com"));
    }

    #[test]
    fn test_resolved_url() {
        let call = CallOptions::new()
            .api_url("https://api.example.com")
            .get("/things")
            .param("perPage", "10");
        let merged = merge(&CallOptions::new(), &call).unwrap();
        assert_eq!(
            merged.resolved_url().unwrap(),
            "https://api.example.com/things?perPage=10"
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let options = CallOptions::new().api_key("secret");
        let debug = format!("{options:?}");
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_merged_debug_redacts_api_key() {
        let merged = merge(&CallOptions::new(), &CallOptions::new().api_key("s3cr3t")).unwrap();
        assert!(merged.headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert!(!format!("{merged:?}").contains("s3cr3t"));
    }

    #[test]
    fn test_debug_redacts_authorization_header() {
        let options = CallOptions::new()
            .header("authorization", "Bearer s3cr3t")
            .header("x-client", "interfetch");
        assert!(!format!("{options:?}").contains("s3cr3t"));
        assert!(format!("{options:?}").contains("interfetch"));

        let merged = merge(&options, &CallOptions::new()).unwrap();
        assert!(!format!("{merged:?}").contains("s3cr3t"));
    }

    #[test]
    fn test_debug_redacts_headers_set_after_merge() {
        let mut merged = merge(&CallOptions::new(), &CallOptions::new()).unwrap();
        merged
            .headers
            .insert(AUTHORIZATION, HeaderValue::from_static("Bearer s3cr3t"));
        assert!(!format!("{merged:?}").contains("s3cr3t"));
    }
}
