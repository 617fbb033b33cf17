use crate::config::get_config_builder;
use ::config::ConfigError;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

pub mod config;


pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(default)]
#[serde(default)]
pub struct ContextConfig {
    /// Upper bound for a buffered request body. `None` reads streams to exhaustion.
    pub max_body_bytes: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(default)]
#[serde(default)]
pub struct CodecConfig {
    pub enabled: Vec<String>,
    /// Content type assumed when a request carries no Content-Type header.
    pub fallback_content_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(default)]
#[serde(default)]
pub struct FerruleConfig {
    pub context: ContextConfig,
    pub codecs: CodecConfig,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            enabled: vec![CONTENT_TYPE_JSON.into(), CONTENT_TYPE_FORM.into()],
            fallback_content_type: None,
        }
    }
}

pub fn load_config(paths: &[String]) -> Result<FerruleConfig, ConfigError> {
    let builder = get_config_builder(paths)?;
    let config = builder.build()?.try_deserialize()?;

    Ok(config)
}
