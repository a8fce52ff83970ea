//! Client-side error types.
//!
//! This module provides [`ApiError`], the error every call rejects with.

use std::sync::Arc;

use http::StatusCode;
use interfetch_core::{CodecError, Reply, UrlError};
use serde_json::Value;

/// Boxed error type accepted by [`ApiError::interceptor`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors a call can settle with.
///
/// Errors raised by interceptors are propagated to the caller exactly as the
/// interceptor returned them.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ApiError {
    /// A request interceptor cancelled the call, or the caller's token fired.
    #[error("request cancelled")]
    Cancelled,

    /// An error raised by an interceptor.
    #[error("interceptor error: {0}")]
    Interceptor(Arc<dyn std::error::Error + Send + Sync>),

    /// The server answered with a status outside `[200, 400)`.
    ///
    /// `payload` is the parsed error body, or the whole response when the
    /// call ran in full-response mode.
    #[error("http error: {status}")]
    Http {
        status: StatusCode,
        payload: Box<Reply>,
    },

    /// The transport failed before a response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The request body could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// The response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The request could not be built (bad header, URL, ...).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Wrap an arbitrary error raised inside an interceptor.
    ///
    /// # Example
    ///
    /// ```
    /// use interfetch::ApiError;
    ///
    /// let err = ApiError::interceptor("vetoed");
    /// assert_eq!(err.to_string(), "interceptor error: vetoed");
    /// ```
    pub fn interceptor<E: Into<BoxError>>(err: E) -> Self {
        ApiError::Interceptor(Arc::from(err.into()))
    }

    /// Build an HTTP error.
    pub fn http(status: StatusCode, payload: Reply) -> Self {
        ApiError::Http {
            status,
            payload: Box::new(payload),
        }
    }

    /// Whether the call was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }

    /// The HTTP status, for HTTP errors.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The payload of an HTTP error.
    pub fn payload(&self) -> Option<&Reply> {
        match self {
            ApiError::Http { payload, .. } => Some(payload),
            _ => None,
        }
    }

    /// Consume an HTTP error, yielding its payload.
    pub fn into_payload(self) -> Option<Reply> {
        match self {
            ApiError::Http { payload, .. } => Some(*payload),
            _ => None,
        }
    }

    /// The error as a JSON value.
    ///
    /// HTTP errors yield their body, cancellation yields `{"cancelled": true}`,
    /// everything else yields `{"message": "..."}`.
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Cancelled => serde_json::json!({ "cancelled": true }),
            ApiError::Http { payload, .. } => payload
                .body()
                .unwrap_or_else(|_| serde_json::json!({ "message": self.to_string() })),
            other => serde_json::json!({ "message": other.to_string() }),
        }
    }

    /// Borrow the inner error of an interceptor failure, downcast to `E`.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            ApiError::Interceptor(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

impl From<CodecError> for ApiError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Encode(msg) => ApiError::Encode(msg),
            CodecError::Decode(msg) => ApiError::Decode(msg),
        }
    }
}

impl From<UrlError> for ApiError {
    fn from(err: UrlError) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}
