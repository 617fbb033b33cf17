use bytes::Bytes;
use ferrule_base::{
    ContextData, DynResponseSink, Path, PathParams, PathResolver, Request, ResponseSink,
    SegmentPathResolver,
};
use ferrule_codecs::CodecService;
use ferrule_config::ContextConfig;
use ferrule_errors::context::ContextError;
use http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::trace;

/// State for a single request: the request and its response sink, the parsed
/// path, a read-once body cache and the data shared between pipeline stages.
///
/// A context belongs to one request and is driven by one task at a time.
pub struct WebContext<W: ResponseSink = DynResponseSink> {
    path: Path,
    data: Option<ContextData>,
    request: Request,
    response: W,
    request_body: Bytes,
    /// Set once the body overran `max_body_bytes`; the stream is then partly consumed.
    body_overflow: Option<usize>,
    codec_service: Arc<dyn CodecService>,
    config: ContextConfig,
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl<W: ResponseSink> WebContext<W> {
    pub fn new(response: W, request: Request, codec_service: Arc<dyn CodecService>) -> Self {
        Self::with_resolver(response, request, codec_service, &SegmentPathResolver)
    }

    pub fn with_resolver(
        response: W,
        request: Request,
        codec_service: Arc<dyn CodecService>,
        resolver: &dyn PathResolver,
    ) -> Self {
        let path = resolver.resolve(request.uri().path());

        Self {
            path,
            data: None,
            request,
            response,
            request_body: Bytes::new(),
            body_overflow: None,
            codec_service,
            config: ContextConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    pub fn codec_service(&self) -> &Arc<dyn CodecService> {
        &self.codec_service
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data shared by the stages handling this request, created on first use.
    pub fn data(&mut self) -> &mut ContextData {
        self.data.get_or_insert_with(ContextData::new)
    }

    pub fn data_if_present(&self) -> Option<&ContextData> {
        self.data.as_ref()
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// Swaps the request, returning the previous one.
    ///
    /// The parsed path and the cached body still describe the original request;
    /// neither is refreshed.
    pub fn set_request(&mut self, request: Request) -> Request {
        std::mem::replace(&mut self.request, request)
    }

    pub fn response(&self) -> &W {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut W {
        &mut self.response
    }

    /// Swaps the response sink, returning the previous one.
    ///
    /// Writes made to the new sink only reach the client if it forwards them to
    /// the original, see [`ferrule_base::BufferedResponse::forwarding`].
    pub fn set_response(&mut self, response: W) -> W {
        std::mem::replace(&mut self.response, response)
    }

    /// HTTP method in upper case, `post` becomes `POST`.
    pub fn method_string(&self) -> String {
        self.request.method().as_str().to_uppercase()
    }

    /// The Content-Type header exactly as sent, or an empty string.
    pub fn content_type(&self) -> String {
        self.request
            .headers()
            .get(CONTENT_TYPE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
            .unwrap_or_default()
    }

    /// Reads the whole body on first call and serves the cached bytes afterwards.
    ///
    /// A failed read leaves the cache empty, so the next call reads again. A body
    /// over the configured limit keeps failing with `BodyTooLarge`.
    pub async fn request_body(&mut self) -> Result<Bytes, ContextError> {
        if !self.request_body.is_empty() {
            return Ok(self.request_body.clone());
        }
        if let Some(limit) = self.body_overflow {
            return Err(ContextError::BodyTooLarge { limit });
        }

        let mut buf = Vec::new();
        match self.config.max_body_bytes {
            Some(limit) => {
                let bound = (limit as u64).saturating_add(1);
                self.request
                    .body_mut()
                    .take(bound)
                    .read_to_end(&mut buf)
                    .await?;
                if buf.len() > limit {
                    self.body_overflow = Some(limit);
                    return Err(ContextError::BodyTooLarge { limit });
                }
            }
            None => {
                self.request.body_mut().read_to_end(&mut buf).await?;
            }
        }

        trace!(bytes = buf.len(), path = %self.path, "Read request body");
        self.request_body = Bytes::from(buf);
        Ok(self.request_body.clone())
    }

    /// Decodes the body with the codec registered for the request's Content-Type.
    ///
    /// The decoded value is not cached; hold on to it rather than calling twice.
    pub async fn request_data(&mut self) -> Result<Value, ContextError> {
        let body = self.request_body().await?;
        let content_type = self.content_type();

        let codec = self
            .codec_service
            .get_codec(&content_type)
            .ok_or_else(|| ContextError::UnsupportedContentType(content_type.clone()))?;

        trace!(content_type = %content_type, codec = codec.content_type(), "Decoding request body");
        codec
            .unmarshal(&body)
            .map_err(|source| ContextError::Decode {
                content_type,
                source,
            })
    }

    pub async fn request_data_array(&mut self) -> Result<Vec<Value>, ContextError> {
        match self.request_data().await? {
            Value::Array(values) => Ok(values),
            other => Err(ContextError::TypeMismatch {
                expected: "array",
                found: value_kind(&other),
            }),
        }
    }

    /// Decodes the body and converts it into `T`.
    pub async fn request_data_as<T: DeserializeOwned>(&mut self) -> Result<T, ContextError> {
        let value = self.request_data().await?;
        serde_json::from_value(value).map_err(ContextError::Deserialize)
    }

    /// Parameters resolved from the path; empty when none were set.
    pub fn path_params(&self) -> &PathParams {
        self.data
            .as_ref()
            .and_then(ContextData::path_params)
            .unwrap_or(PathParams::empty())
    }

    /// Looks up a path parameter, returning `""` when it is not set.
    pub fn path_param(&self, key: &str) -> &str {
        self.try_path_param(key).unwrap_or_default()
    }

    /// Like [`WebContext::path_param`], but tells a missing parameter apart from an empty one.
    pub fn try_path_param(&self, key: &str) -> Option<&str> {
        self.path_params().get(key)
    }

    pub fn set_path_params(&mut self, params: impl Into<PathParams>) -> Option<PathParams> {
        self.data().set_path_params(params.into())
    }
}
