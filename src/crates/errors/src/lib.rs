pub mod codec;
pub mod context;

use crate::codec::CodecError;
use crate::context::ContextError;
use config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FerruleError {
    #[error("Context Error: {0}")]
    ContextError(#[from] ContextError),
    #[error("Codec Error: {0}")]
    CodecError(#[from] CodecError),
    #[error("Config Error {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("IO Error {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}
