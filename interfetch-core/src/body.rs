//! Request body types.
//!
//! A request body is either a JSON document, which interceptors can read and
//! rewrite, or an opaque byte payload (multipart forms, files, pre-encoded
//! data) that is forwarded to the transport exactly as given.

use bytes::Bytes;
use http::HeaderValue;
use serde::Serialize;
use serde_json::Value;

use crate::CodecError;

/// The body of an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// A JSON document, serialized when the request is sent.
    Json(Value),
    /// Opaque bytes, sent untouched.
    ///
    /// `content_type` is the payload's own media type (for example a
    /// `multipart/form-data; boundary=...` value). It is used as the request
    /// `content-type` unless one was set explicitly.
    Raw {
        content_type: Option<HeaderValue>,
        data: Bytes,
    },
}

impl Body {
    /// Serialize a value into a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, CodecError> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(CodecError::encode)
    }

    /// Create an opaque body without a media type of its own.
    pub fn raw(data: impl Into<Bytes>) -> Self {
        Body::Raw {
            content_type: None,
            data: data.into(),
        }
    }

    /// Create an opaque body that carries its own media type.
    ///
    /// # Example
    ///
    /// ```
    /// use http::HeaderValue;
    /// use interfetch_core::Body;
    ///
    /// let body = Body::with_content_type(
    ///     "--x\r\n...\r\n--x--",
    ///     HeaderValue::from_static("multipart/form-data; boundary=x"),
    /// );
    /// assert!(body.is_raw());
    /// ```
    pub fn with_content_type(data: impl Into<Bytes>, content_type: HeaderValue) -> Self {
        Body::Raw {
            content_type: Some(content_type),
            data: data.into(),
        }
    }

    /// Whether this is an opaque body.
    pub fn is_raw(&self) -> bool {
        matches!(self, Body::Raw { .. })
    }

    /// The media type carried by an opaque body.
    pub fn content_type(&self) -> Option<&HeaderValue> {
        match self {
            Body::Raw { content_type, .. } => content_type.as_ref(),
            Body::Json(_) => None,
        }
    }

    /// Borrow the JSON document, if this is a JSON body.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Raw { .. } => None,
        }
    }

    /// Mutably borrow the JSON document, if this is a JSON body.
    pub fn as_json_mut(&mut self) -> Option<&mut Value> {
        match self {
            Body::Json(value) => Some(value),
            Body::Raw { .. } => None,
        }
    }

    /// Encode the body into the bytes handed to the transport.
    pub fn encode(&self) -> Result<Bytes, CodecError> {
        match self {
            Body::Json(value) => serde_json::to_vec(value)
                .map(Bytes::from)
                .map_err(CodecError::encode),
            Body::Raw { data, .. } => Ok(data.clone()),
        }
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<Bytes> for Body {
    fn from(data: Bytes) -> Self {
        Body::raw(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Thing {
        name: &'static str,
        count: u32,
    }

    #[test]
    fn test_json_body_from_struct() {
        let body = Body::json(&Thing {
            name: "lamp",
            count: 2,
        })
        .unwrap();
        assert_eq!(body.as_json(), Some(&json!({"name": "lamp", "count": 2})));
        assert!(!body.is_raw());
    }

    #[test]
    fn test_json_body_encode() {
        let body = Body::from(json!({"count": 1}));
        assert_eq!(body.encode().unwrap(), Bytes::from_static(br#"{"count":1}"#));
    }

    #[test]
    fn test_json_body_mutation() {
        let mut body = Body::from(json!({"count": 0}));
        body.as_json_mut().unwrap()["count"] = json!(5);
        assert_eq!(body.as_json().unwrap()["count"], 5);
    }

    #[test]
    fn test_raw_body_is_untouched() {
        let data = Bytes::from_static(b"\x00\x01not json");
        let body = Body::raw(data.clone());
        assert!(body.is_raw());
        assert!(body.as_json().is_none());
        assert!(body.content_type().is_none());
        assert_eq!(body.encode().unwrap(), data);
    }

    #[test]
    fn test_raw_body_content_type() {
        let ct = HeaderValue::from_static("multipart/form-data; boundary=abc");
        let body = Body::with_content_type("--abc--", ct.clone());
        assert_eq!(body.content_type(), Some(&ct));
    }
}
