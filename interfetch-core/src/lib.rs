//! Core request/response types for interfetch.
//!
//! This crate holds the pieces of the client that do no I/O:
//! - [`Body`]: outgoing request payloads (JSON or opaque bytes)
//! - [`Response`] and [`Reply`]: buffered responses with a composable JSON accessor
//! - [`resolve_url`]: joins a base URL, a path and query parameters
//! - [`merge_headers`]: layered, per-key header merging with credential redaction
//! - [`CodecError`] / [`UrlError`]: failures raised by the helpers above

mod body;
mod error;
mod headers;
mod response;
mod url;

pub use body::Body;
pub use error::{CodecError, UrlError};
pub use headers::{
    JSON_CONTENT_TYPE, SENSITIVE_HEADERS, default_headers, mark_sensitive, merge_headers,
    overlay_headers, redacted,
};
pub use response::{JsonTransform, Reply, Response, decode_json, is_success};
pub use url::resolve_url;

pub use indexmap::IndexMap;
