//! Response types.
//!
//! [`Response`] is a fully buffered HTTP response. Its [`json`](Response::json)
//! accessor parses the body on every call and then applies any JSON transforms
//! attached with [`map_json`](Response::map_json), so an interceptor can wrap
//! the accessor and every later caller sees the same wrapped output.
//!
//! [`Reply`] is what a call hands back: the parsed body by default, or the
//! whole [`Response`] in full-response mode.

use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode, header::CONTENT_TYPE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{CodecError, JSON_CONTENT_TYPE};

/// A transform applied to the parsed JSON body of a [`Response`].
pub type JsonTransform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Whether a status takes the success branch: `200 <= status < 400`.
pub fn is_success(status: StatusCode) -> bool {
    (200..400).contains(&status.as_u16())
}

/// Parse a JSON body. An empty (or all-whitespace) body parses as `null`.
pub fn decode_json(bytes: &[u8]) -> Result<Value, CodecError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(CodecError::decode)
}

/// A buffered HTTP response.
#[derive(Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    transforms: Vec<JsonTransform>,
}

impl Response {
    /// Create a response from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
            transforms: Vec::new(),
        }
    }

    /// Create a response whose body is `value` encoded as JSON.
    pub fn from_json<T: Serialize + ?Sized>(
        status: StatusCode,
        value: &T,
    ) -> Result<Self, CodecError> {
        let body = serde_json::to_vec(value).map_err(CodecError::encode)?;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        Ok(Self::new(status, headers, Bytes::from(body)))
    }

    /// The HTTP status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the status is in `[200, 400)`.
    pub fn ok(&self) -> bool {
        is_success(self.status)
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the response headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The raw body bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// The body as UTF-8 text, with invalid sequences replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the body as JSON and apply every attached transform in order.
    ///
    /// Can be called any number of times; each call yields the same value.
    pub fn json(&self) -> Result<Value, CodecError> {
        let value = decode_json(&self.body)?;
        Ok(self.transforms.iter().fold(value, |acc, f| f(acc)))
    }

    /// Parse the (transformed) JSON body into `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        serde_json::from_value(self.json()?).map_err(CodecError::decode)
    }

    /// Compose `f` onto the JSON accessor, returning the wrapped response.
    ///
    /// # Example
    ///
    /// ```
    /// use http::StatusCode;
    /// use interfetch_core::Response;
    /// use serde_json::json;
    ///
    /// let res = Response::from_json(StatusCode::OK, &json!({"name": "lamp"}))
    ///     .unwrap()
    ///     .map_json(|mut v| {
    ///         v["patched"] = json!(true);
    ///         v
    ///     });
    ///
    /// assert_eq!(res.json().unwrap(), json!({"name": "lamp", "patched": true}));
    /// assert_eq!(res.json().unwrap(), res.json().unwrap());
    /// ```
    pub fn map_json<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.wrap_json(f);
        self
    }

    /// Compose `f` onto the JSON accessor in place.
    pub fn wrap_json<F>(&mut self, f: F)
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transforms.push(Arc::new(f));
    }
}

impl From<http::Response<Bytes>> for Response {
    fn from(response: http::Response<Bytes>) -> Self {
        let (parts, body) = response.into_parts();
        Self::new(parts.status, parts.headers, body)
    }
}

impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("transforms", &self.transforms.len())
            .finish()
    }
}

/// The value a call resolves (or an HTTP error carries).
#[derive(Debug, Clone)]
pub enum Reply {
    /// The parsed JSON body (default mode).
    Body(Value),
    /// The whole response (full-response mode).
    Full(Response),
}

impl Reply {
    /// The JSON body: the value itself, or the response's parsed body.
    pub fn body(&self) -> Result<Value, CodecError> {
        match self {
            Reply::Body(value) => Ok(value.clone()),
            Reply::Full(response) => response.json(),
        }
    }

    /// Deserialize the JSON body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        serde_json::from_value(self.body()?).map_err(CodecError::decode)
    }

    /// Whether this reply carries the whole response.
    pub fn is_full(&self) -> bool {
        matches!(self, Reply::Full(_))
    }

    pub fn as_body(&self) -> Option<&Value> {
        match self {
            Reply::Body(value) => Some(value),
            Reply::Full(_) => None,
        }
    }

    pub fn as_body_mut(&mut self) -> Option<&mut Value> {
        match self {
            Reply::Body(value) => Some(value),
            Reply::Full(_) => None,
        }
    }

    pub fn as_response(&self) -> Option<&Response> {
        match self {
            Reply::Full(response) => Some(response),
            Reply::Body(_) => None,
        }
    }

    pub fn as_response_mut(&mut self) -> Option<&mut Response> {
        match self {
            Reply::Full(response) => Some(response),
            Reply::Body(_) => None,
        }
    }

    pub fn into_body(self) -> Option<Value> {
        match self {
            Reply::Body(value) => Some(value),
            Reply::Full(_) => None,
        }
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            Reply::Full(response) => Some(response),
            Reply::Body(_) => None,
        }
    }
}
