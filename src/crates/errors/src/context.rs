use crate::codec::CodecError;
use thiserror::Error;

/// Failures surfaced by a request context while reading or decoding the payload.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("No codec available for content type {0:?}")]
    UnsupportedContentType(String),
    #[error("Failed to decode {content_type:?} payload: {source}")]
    Decode {
        content_type: String,
        #[source]
        source: CodecError,
    },
    #[error("Expected {expected} payload but decoded {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("Request body exceeds the limit of {limit} bytes")]
    BodyTooLarge { limit: usize },
    #[error("Payload does not match the requested type: {0}")]
    Deserialize(#[source] serde_json::Error),
}
