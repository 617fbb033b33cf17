use crate::Codec;
use ferrule_config::CONTENT_TYPE_FORM;
use ferrule_errors::codec::CodecError;
use serde_json::{Map, Value};

/// `application/x-www-form-urlencoded` bodies.
///
/// A key seen once decodes to a string, a repeated key to an array of strings
/// in the order the pairs appear.
#[derive(Debug, Default, Clone, Copy)]
pub struct FormCodec;

fn scalar_to_string(key: &str, value: &Value) -> Result<String, CodecError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => Err(CodecError::Unencodable(format!(
            "form field {key} must be a scalar or a list of scalars"
        ))),
    }
}

impl Codec for FormCodec {
    fn content_type(&self) -> &'static str {
        CONTENT_TYPE_FORM
    }

    fn file_extension(&self) -> &'static str {
        "form"
    }

    fn unmarshal(&self, data: &[u8]) -> Result<Value, CodecError> {
        if std::str::from_utf8(data).is_err() {
            return Err(CodecError::Malformed("form body is not valid UTF-8".into()));
        }

        let mut fields = Map::new();
        for (key, value) in form_urlencoded::parse(data).into_owned() {
            let value = Value::String(value);
            match fields.get_mut(&key) {
                None => {
                    fields.insert(key, value);
                }
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            }
        }

        Ok(Value::Object(fields))
    }

    fn marshal(&self, value: &Value) -> Result<Vec<u8>, CodecError> {
        let Value::Object(fields) = value else {
            return Err(CodecError::Unencodable(
                "form payloads must be objects".into(),
            ));
        };

        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in fields {
            match value {
                Value::Array(values) => {
                    for item in values {
                        serializer.append_pair(key, &scalar_to_string(key, item)?);
                    }
                }
                other => {
                    serializer.append_pair(key, &scalar_to_string(key, other)?);
                }
            }
        }

        Ok(serializer.finish().into_bytes())
    }
}
