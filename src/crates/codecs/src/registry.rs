use crate::{media_type, Codec, FormCodec, JsonCodec};
use ferrule_config::CodecConfig;
use ferrule_errors::codec::CodecError;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Lookup contract a request context uses to find a decoder for a payload.
pub trait CodecService: Send + Sync {
    /// Finds the codec for a raw Content-Type header value, parameters included.
    fn get_codec(&self, content_type: &str) -> Option<Arc<dyn Codec>>;

    fn get_codec_for_extension(&self, _extension: &str) -> Option<Arc<dyn Codec>> {
        None
    }
}

pub struct CodecRegistry {
    codecs: HashMap<String, Arc<dyn Codec>>,
    fallback_content_type: Option<String>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self {
            codecs: HashMap::from_iter(Self::builtin_codecs()),
            fallback_content_type: None,
        }
    }

    pub fn new_empty() -> Self {
        Self {
            codecs: HashMap::new(),
            fallback_content_type: None,
        }
    }

    pub fn builtin_codecs() -> Vec<(String, Arc<dyn Codec>)> {
        let codecs: Vec<Arc<dyn Codec>> = vec![Arc::new(JsonCodec), Arc::new(FormCodec)];
        codecs
            .into_iter()
            .map(|codec| (codec.content_type().to_string(), codec))
            .collect()
    }

    /// Registers only the built-in codecs named in `config.enabled`.
    pub fn from_config(config: &CodecConfig) -> Result<Self, CodecError> {
        let builtin: HashMap<String, Arc<dyn Codec>> =
            HashMap::from_iter(Self::builtin_codecs());
        let mut registry = Self::new_empty();

        for content_type in &config.enabled {
            let key = media_type(content_type);
            let codec = builtin
                .get(&key)
                .cloned()
                .ok_or_else(|| CodecError::UnknownCodec(content_type.clone()))?;
            registry.codecs.insert(key, codec);
        }

        registry.fallback_content_type = config.fallback_content_type.clone();
        debug!(
            codecs = registry.codecs.len(),
            fallback = ?registry.fallback_content_type,
            "Built codec registry"
        );

        Ok(registry)
    }

    pub fn with_fallback(mut self, content_type: impl Into<String>) -> Self {
        self.fallback_content_type = Some(content_type.into());
        self
    }

    /// Adds or replaces the codec for its content type.
    pub fn add_codec<C: Codec>(&mut self, codec: C) {
        self.codecs
            .insert(media_type(codec.content_type()), Arc::new(codec));
    }

    pub fn remove_codec(&mut self, content_type: &str) {
        self.codecs.remove(&media_type(content_type));
    }

    pub fn content_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.codecs.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecService for CodecRegistry {
    fn get_codec(&self, content_type: &str) -> Option<Arc<dyn Codec>> {
        let mut key = media_type(content_type);
        if key.is_empty() {
            key = media_type(self.fallback_content_type.as_deref()?);
        }

        let codec = self.codecs.get(&key).cloned();
        trace!(content_type, resolved = %key, found = codec.is_some(), "Codec lookup");
        codec
    }

    fn get_codec_for_extension(&self, extension: &str) -> Option<Arc<dyn Codec>> {
        let extension = extension.trim_start_matches('.');
        self.codecs
            .values()
            .find(|codec| codec.file_extension().eq_ignore_ascii_case(extension))
            .cloned()
    }
}
