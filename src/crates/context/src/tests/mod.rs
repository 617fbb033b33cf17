
use crate::WebContext;
use bytes::Bytes;
use ferrule_base::{BufferedResponse, Path, PathResolver, RequestBody, ResponseSink};
use ferrule_codecs::{CodecRegistry, CodecService};
use ferrule_config::{ContextConfig, CONTENT_TYPE_FORM, CONTENT_TYPE_JSON};
use ferrule_errors::codec::CodecError;
use ferrule_errors::context::ContextError;
use http::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use support::{request, CountingReader, FlakyReader};

fn registry() -> Arc<dyn CodecService> {
    Arc::new(CodecRegistry::new())
}

fn context_with(
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: impl Into<RequestBody>,
) -> WebContext<BufferedResponse> {
    WebContext::new(
        BufferedResponse::new(),
        request(method, uri, content_type, body),
        registry(),
    )
}

fn json_context(body: &'static str) -> WebContext<BufferedResponse> {
    context_with("POST", "/items", Some(CONTENT_TYPE_JSON), body)
}

#[tokio::test]
async fn body_is_read_from_the_stream_once() {
    let (reader, polls) = CountingReader::new(b"{\"a\":1}");
    let mut ctx = context_with(
        "POST",
        "/items",
        Some(CONTENT_TYPE_JSON),
        RequestBody::from_reader(reader),
    );

    let first = ctx.request_body().await.unwrap();
    let polls_after_first = polls.get();
    assert!(polls_after_first > 0);

    let second = ctx.request_body().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first, Bytes::from_static(b"{\"a\":1}"));
    assert_eq!(polls.get(), polls_after_first);
}

#[tokio::test]
async fn failed_body_read_is_not_cached() {
    let mut ctx = context_with(
        "POST",
        "/items",
        Some(CONTENT_TYPE_JSON),
        RequestBody::from_reader(FlakyReader::new(b"[1]")),
    );

    match ctx.request_body().await {
        Err(ContextError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::ConnectionReset),
        other => panic!("expected Io error, got {other:?}"),
    }

    let body = ctx.request_body().await.unwrap();
    assert_eq!(body, Bytes::from_static(b"[1]"));
}

#[tokio::test]
async fn io_failure_propagates_through_decode() {
    let mut ctx = context_with(
        "POST",
        "/items",
        Some(CONTENT_TYPE_JSON),
        RequestBody::from_reader(FlakyReader::new(b"{}")),
    );

    assert!(matches!(
        ctx.request_data().await,
        Err(ContextError::Io(_))
    ));
}

#[tokio::test]
async fn body_over_limit_is_rejected() {
    let mut ctx = json_context("[1,2,3,4,5]").with_config(ContextConfig {
        max_body_bytes: Some(4),
    });

    match ctx.request_body().await {
        Err(ContextError::BodyTooLarge { limit }) => assert_eq!(limit, 4),
        other => panic!("expected BodyTooLarge, got {other:?}"),
    }
}

#[tokio::test]
async fn oversized_body_stays_rejected() {
    let mut ctx = json_context("[1,2,3]").with_config(ContextConfig {
        max_body_bytes: Some(4),
    });

    for _ in 0..2 {
        assert!(matches!(
            ctx.request_body().await,
            Err(ContextError::BodyTooLarge { limit: 4 })
        ));
    }
    assert!(matches!(
        ctx.request_data().await,
        Err(ContextError::BodyTooLarge { limit: 4 })
    ));
}

#[tokio::test]
async fn body_at_limit_is_accepted() {
    let mut ctx = json_context("[1]").with_config(ContextConfig {
        max_body_bytes: Some(3),
    });

    assert_eq!(ctx.request_body().await.unwrap(), Bytes::from_static(b"[1]"));
}

#[tokio::test]
async fn decodes_json_by_content_type() {
    let mut ctx = json_context(r#"{"a":1}"#);
    assert_eq!(ctx.request_data().await.unwrap(), json!({ "a": 1 }));
}

#[tokio::test]
async fn content_type_parameters_are_passed_to_the_registry() {
    let mut ctx = context_with(
        "POST",
        "/items",
        Some("application/json; charset=utf-8"),
        r#"{"a":1}"#,
    );
    assert_eq!(ctx.content_type(), "application/json; charset=utf-8");
    assert_eq!(ctx.request_data().await.unwrap(), json!({ "a": 1 }));
}

#[tokio::test]
async fn decodes_form_bodies() {
    let mut ctx = context_with("POST", "/items", Some(CONTENT_TYPE_FORM), "id=1&id=2&q=x");
    assert_eq!(
        ctx.request_data().await.unwrap(),
        json!({ "id": ["1", "2"], "q": "x" })
    );
}

#[tokio::test]
async fn unknown_content_type_is_unsupported() {
    let mut ctx = context_with("POST", "/items", Some("application/unknown"), r#"{"a":1}"#);
    match ctx.request_data().await {
        Err(ContextError::UnsupportedContentType(ct)) => assert_eq!(ct, "application/unknown"),
        other => panic!("expected UnsupportedContentType, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_content_type_is_unsupported_without_fallback() {
    let mut ctx = context_with("POST", "/items", None, r#"{"a":1}"#);
    assert!(matches!(
        ctx.request_data().await,
        Err(ContextError::UnsupportedContentType(ct)) if ct.is_empty()
    ));
}

#[tokio::test]
async fn missing_content_type_uses_registry_fallback() {
    let codecs: Arc<dyn CodecService> =
        Arc::new(CodecRegistry::new().with_fallback(CONTENT_TYPE_JSON));
    let mut ctx = WebContext::new(
        BufferedResponse::new(),
        request("POST", "/items", None, "[true]"),
        codecs,
    );
    assert_eq!(ctx.request_data().await.unwrap(), json!([true]));
}

#[tokio::test]
async fn malformed_payload_is_a_decode_error() {
    let mut ctx = json_context(r#"{"a":"#);
    match ctx.request_data().await {
        Err(ContextError::Decode {
            content_type,
            source: CodecError::Malformed(_),
        }) => assert_eq!(content_type, CONTENT_TYPE_JSON),
        other => panic!("expected Decode error, got {other:?}"),
    }
}

#[tokio::test]
async fn decode_reuses_cached_body() {
    let (reader, polls) = CountingReader::new(b"[1,2]");
    let mut ctx = context_with(
        "POST",
        "/items",
        Some(CONTENT_TYPE_JSON),
        RequestBody::from_reader(reader),
    );

    let first = ctx.request_data().await.unwrap();
    let polls_after_first = polls.get();
    let second = ctx.request_data().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(polls.get(), polls_after_first);
}

#[tokio::test]
async fn array_variant_returns_elements() {
    let mut ctx = json_context("[1,2,3]");
    let values = ctx.request_data_array().await.unwrap();
    assert_eq!(values, vec![json!(1), json!(2), json!(3)]);
}

#[tokio::test]
async fn array_variant_rejects_objects() {
    let mut ctx = json_context(r#"{"a":1}"#);
    match ctx.request_data_array().await {
        Err(ContextError::TypeMismatch { expected, found }) => {
            assert_eq!(expected, "array");
            assert_eq!(found, "object");
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
}

#[derive(Debug, Deserialize, PartialEq)]
struct NewItem {
    name: String,
    quantity: u32,
}

#[tokio::test]
async fn typed_decode() {
    let mut ctx = json_context(r#"{"name":"bolt","quantity":3}"#);
    let item: NewItem = ctx.request_data_as().await.unwrap();
    assert_eq!(
        item,
        NewItem {
            name: "bolt".into(),
            quantity: 3
        }
    );
}

#[tokio::test]
async fn typed_decode_reports_shape_errors() {
    let mut ctx = json_context(r#"{"name":"bolt"}"#);
    assert!(matches!(
        ctx.request_data_as::<NewItem>().await,
        Err(ContextError::Deserialize(_))
    ));
}

#[test]
fn path_params_default_to_empty() {
    let ctx = json_context("");
    assert!(ctx.path_params().is_empty());
    assert_eq!(ctx.path_param("id"), "");
    assert_eq!(ctx.try_path_param("id"), None);
    assert!(ctx.data_if_present().is_none());
}

#[test]
fn path_params_round_trip() {
    let mut ctx = json_context("");
    let mut params = HashMap::new();
    params.insert("id".to_string(), "42".to_string());
    assert!(ctx.set_path_params(params).is_none());

    assert_eq!(ctx.path_param("id"), "42");
    assert_eq!(ctx.path_param("missing"), "");
    assert_eq!(ctx.path_params().len(), 1);
}

#[test]
fn empty_parameter_is_distinct_from_missing() {
    let mut ctx = json_context("");
    ctx.data().path_params_mut().insert("slug", "");

    assert_eq!(ctx.path_param("slug"), "");
    assert_eq!(ctx.try_path_param("slug"), Some(""));
    assert_eq!(ctx.try_path_param("other"), None);
}

#[test]
fn data_bag_is_shared_between_calls() {
    let mut ctx = json_context("");
    ctx.data().insert("user_id", 7u64);
    *ctx.data().get_mut::<u64>("user_id").unwrap() += 1;

    assert_eq!(ctx.data().get::<u64>("user_id"), Some(&8));
    assert!(ctx.data_if_present().is_some());
}

#[test]
fn data_bag_values_do_not_leak_into_path_params() {
    let mut ctx = json_context("");
    ctx.data().insert("id", "not a path param".to_string());
    assert_eq!(ctx.path_param("id"), "");
}

#[test]
fn method_is_upper_cased() {
    let ctx = context_with("post", "/items", None, "");
    assert_eq!(ctx.method_string(), "POST");
    assert_eq!(context_with("GET", "/", None, "").method_string(), "GET");
}

#[test]
fn path_is_parsed_at_construction() {
    let ctx = context_with("GET", "/people/123/books.json?page=2", None, "");
    assert_eq!(ctx.path().segments(), ["people", "123", "books.json"]);
    assert_eq!(ctx.path().extension(), Some("json"));
    assert_eq!(ctx.path().raw(), "/people/123/books.json");
}

struct VersionedResolver;

impl PathResolver for VersionedResolver {
    fn resolve(&self, raw: &str) -> Path {
        Path::new(raw.strip_prefix("/v1").unwrap_or(raw))
    }
}

#[test]
fn custom_resolver_is_used() {
    let ctx = WebContext::with_resolver(
        BufferedResponse::new(),
        request("GET", "/v1/people", None, ""),
        registry(),
        &VersionedResolver,
    );
    assert_eq!(ctx.path().segments(), ["people"]);
}

#[tokio::test]
async fn replacing_the_request_keeps_path_and_body_cache() {
    let mut ctx = json_context("[1]");
    let cached = ctx.request_body().await.unwrap();

    let previous = ctx.set_request(request("DELETE", "/other", Some(CONTENT_TYPE_JSON), "[2]"));
    assert_eq!(previous.uri().path(), "/items");

    assert_eq!(ctx.path().raw(), "/items");
    assert_eq!(ctx.method_string(), "DELETE");
    assert_eq!(ctx.request_body().await.unwrap(), cached);
}

#[tokio::test]
async fn replacing_the_response_swaps_the_sink() {
    let mut ctx = json_context("");
    ctx.response_mut().set_status(StatusCode::CREATED);

    let previous = ctx.set_response(BufferedResponse::new());
    assert_eq!(previous.status(), StatusCode::CREATED);
    assert_eq!(ctx.response().status(), StatusCode::OK);

    ctx.response_mut()
        .write_body(Bytes::from_static(b"done"))
        .await
        .unwrap();
    assert_eq!(ctx.response().body(), b"done");
}

#[test]
fn codec_service_is_the_one_given() {
    let codecs = registry();
    let ctx = WebContext::new(
        BufferedResponse::new(),
        request("GET", "/", None, ""),
        codecs.clone(),
    );
    assert!(Arc::ptr_eq(ctx.codec_service(), &codecs));
    assert!(ctx.codec_service().get_codec(CONTENT_TYPE_JSON).is_some());
}

#[test]
fn content_type_is_empty_when_absent() {
    let ctx = context_with("GET", "/", None, "");
    assert_eq!(ctx.content_type(), "");
}
