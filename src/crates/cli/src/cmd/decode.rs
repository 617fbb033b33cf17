use crate::CmdDecode;
use bytes::Bytes;
use ferrule_base::{BufferedResponse, PathParams, Request, RequestBody, ResponseSink};
use ferrule_codecs::{Codec, CodecRegistry, CodecService};
use ferrule_config::{load_config, FerruleConfig, CONTENT_TYPE_JSON};
use ferrule_context::WebContext;
use ferrule_errors::codec::CodecError;
use ferrule_errors::FerruleError;
use http::header::CONTENT_TYPE;
use http::HeaderValue;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

pub fn decode_cmd(cmd: CmdDecode) -> Result<(), FerruleError> {
    let config = if cmd.config.is_empty() {
        FerruleConfig::default()
    } else {
        load_config(&cmd.config)?
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let output = runtime.block_on(decode(cmd, config))?;
    std::io::stdout().write_all(&output)?;
    Ok(())
}

async fn open_body(cmd: &CmdDecode) -> Result<RequestBody, FerruleError> {
    Ok(match &cmd.file {
        Some(file) => RequestBody::from_reader(tokio::fs::File::open(file).await?),
        None => RequestBody::from_reader(tokio::io::stdin()),
    })
}

fn build_request(cmd: &CmdDecode, body: RequestBody) -> Result<Request, FerruleError> {
    let mut builder = http::Request::builder()
        .method(cmd.method.as_str())
        .uri(cmd.path.as_str());
    if let Some(content_type) = &cmd.content_type {
        builder = builder.header(CONTENT_TYPE, content_type.as_str());
    }

    builder
        .body(body)
        .map_err(|e| FerruleError::Other(format!("Invalid request: {e}")))
}

/// Output codec: `--output-type`, then the path's extension, then JSON.
fn output_codec(
    cmd: &CmdDecode,
    ctx: &WebContext<BufferedResponse>,
) -> Result<Arc<dyn Codec>, CodecError> {
    let codecs = ctx.codec_service();
    match &cmd.output_type {
        Some(output_type) => codecs
            .get_codec(output_type)
            .ok_or_else(|| CodecError::UnknownCodec(output_type.clone())),
        None => ctx
            .path()
            .extension()
            .and_then(|ext| codecs.get_codec_for_extension(ext))
            .or_else(|| codecs.get_codec(CONTENT_TYPE_JSON))
            .ok_or_else(|| CodecError::UnknownCodec(CONTENT_TYPE_JSON.to_string())),
    }
}

pub(crate) async fn decode(cmd: CmdDecode, config: FerruleConfig) -> Result<Vec<u8>, FerruleError> {
    let registry: Arc<dyn CodecService> = Arc::new(CodecRegistry::from_config(&config.codecs)?);
    let request = build_request(&cmd, open_body(&cmd).await?)?;

    let mut ctx = WebContext::new(BufferedResponse::new(), request, registry)
        .with_config(config.context);
    if !cmd.params.is_empty() {
        ctx.set_path_params(cmd.params.iter().cloned().collect::<PathParams>());
    }

    info!(
        method = %ctx.method_string(),
        path = %ctx.path(),
        segments = ?ctx.path().segments(),
        params = ?ctx.path_params(),
        "Decoding request"
    );

    let value = ctx.request_data().await?;
    let codec = output_codec(&cmd, &ctx)?;
    let encoded = codec.marshal(&value)?;

    let response = ctx.response_mut();
    response.insert_header(CONTENT_TYPE, HeaderValue::from_static(codec.content_type()));
    response.write_body(Bytes::from(encoded)).await?;

    Ok(ctx.response().body().to_vec())
}
