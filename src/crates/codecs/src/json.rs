use crate::Codec;
use ferrule_config::CONTENT_TYPE_JSON;
use ferrule_errors::codec::CodecError;
use serde_json::Value;

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        CONTENT_TYPE_JSON
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }

    fn unmarshal(&self, data: &[u8]) -> Result<Value, CodecError> {
        serde_json::from_slice(data).map_err(|e| CodecError::Malformed(e.to_string()))
    }

    fn marshal(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(|e| CodecError::Unencodable(e.to_string()))
    }
}
