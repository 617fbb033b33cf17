pub mod form;
pub mod json;
pub mod registry;

pub use form::FormCodec;
pub use json::JsonCodec;
pub use registry::{CodecRegistry, CodecService};

use ferrule_errors::codec::CodecError;
use serde_json::Value;

/// Encodes and decodes one content type to and from a generic [`Value`].
pub trait Codec: Send + Sync + 'static {
    /// Canonical content type, lowercase and without parameters.
    fn content_type(&self) -> &'static str;

    /// File extension that selects this codec, e.g. `json` for `/people.json`.
    fn file_extension(&self) -> &'static str;

    fn unmarshal(&self, data: &[u8]) -> Result<Value, CodecError>;

    fn marshal(&self, value: &Value) -> Result<Vec<u8>, CodecError>;
}

/// Reduces a Content-Type header value to its lowercase media type.
///
/// `"Application/JSON; charset=utf-8"` becomes `"application/json"`.
pub fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
