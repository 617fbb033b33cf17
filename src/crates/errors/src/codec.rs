use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Serialize, Deserialize, Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Malformed payload: {0}")]
    Malformed(String),
    #[error("Value cannot be encoded: {0}")]
    Unencodable(String),
    #[error("No built-in codec for content type {0}")]
    UnknownCodec(String),
}
