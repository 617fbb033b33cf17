use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use std::fmt;
use tracing::trace;

/// Outbound side of a request. The context only stores it; handlers write to it.
#[async_trait]
pub trait ResponseSink: Send {
    fn set_status(&mut self, status: StatusCode);

    fn insert_header(&mut self, name: HeaderName, value: HeaderValue);

    async fn write_body(&mut self, chunk: Bytes) -> std::io::Result<()>;
}

pub type DynResponseSink = Box<dyn ResponseSink>;

#[async_trait]
impl ResponseSink for Box<dyn ResponseSink> {
    fn set_status(&mut self, status: StatusCode) {
        (**self).set_status(status);
    }

    fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        (**self).insert_header(name, value);
    }

    async fn write_body(&mut self, chunk: Bytes) -> std::io::Result<()> {
        (**self).write_body(chunk).await
    }
}

/// Keeps everything written to it in memory.
///
/// Built with [`BufferedResponse::forwarding`] it also passes every write on to
/// the sink it replaced, so a client still receives the response while it is
/// being captured.
pub struct BufferedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    forward: Option<DynResponseSink>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: BytesMut::new(),
            forward: None,
        }
    }

    pub fn forwarding(original: DynResponseSink) -> Self {
        Self {
            forward: Some(original),
            ..Self::new()
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Hands back the wrapped sink, if any, dropping the captured state.
    pub fn into_inner(self) -> Option<DynResponseSink> {
        self.forward
    }
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BufferedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferedResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("forwarding", &self.forward.is_some())
            .finish()
    }
}

#[async_trait]
impl ResponseSink for BufferedResponse {
    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
        if let Some(inner) = self.forward.as_mut() {
            inner.set_status(status);
        }
    }

    fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        if let Some(inner) = self.forward.as_mut() {
            inner.insert_header(name.clone(), value.clone());
        }
        self.headers.insert(name, value);
    }

    async fn write_body(&mut self, chunk: Bytes) -> std::io::Result<()> {
        trace!(bytes = chunk.len(), "Buffering response chunk");
        self.body.extend_from_slice(&chunk);
        if let Some(inner) = self.forward.as_mut() {
            inner.write_body(chunk).await?;
        }
        Ok(())
    }
}
