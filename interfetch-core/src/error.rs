//! Errors raised by the core helpers.

/// Failure while turning values into bytes or bytes back into values.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// A request body could not be serialized.
    #[error("encode error: {0}")]
    Encode(String),

    /// A response body was not valid JSON for the requested type.
    #[error("decode error: {0}")]
    Decode(String),
}

impl CodecError {
    pub(crate) fn encode(err: impl std::fmt::Display) -> Self {
        CodecError::Encode(err.to_string())
    }

    pub(crate) fn decode(err: impl std::fmt::Display) -> Self {
        CodecError::Decode(err.to_string())
    }
}

/// Failure while building the final request URL.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UrlError {
    /// The query parameters could not be encoded.
    #[error("invalid query parameters: {0}")]
    Query(String),
}
