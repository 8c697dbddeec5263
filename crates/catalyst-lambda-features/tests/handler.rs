//! Integration tests driving the Lambda handler with raw trigger events.

use catalyst_gateway::test_utils::{
    mock_request_id, sample_event, FailingBackend, RecordingBackend, SAMPLE_HOST, SAMPLE_PREFIX,
};
use catalyst_gateway::{
    BodyEncoding, EventShape, FeaturesBackend, Gateway, GatewayConfig, ResponseEnvelope,
    Separator, GENERIC_ERROR_MESSAGE,
};
use catalyst_lambda_features::{handler, DetachedBackend};
use lambda_runtime::{Context, LambdaEvent};
use serde_json::{json, Value};

const SHAPES: [EventShape; 3] = [
    EventShape::CustomPath,
    EventShape::SimpleProxy,
    EventShape::ResourceTemplate,
];

fn gateway(shape: EventShape, separator: Separator, encoding: BodyEncoding) -> Gateway {
    Gateway::new(GatewayConfig {
        shape,
        route_prefix: SAMPLE_PREFIX.to_string(),
        separator,
        body_encoding: encoding,
        base_url: Some(format!("https://{}", SAMPLE_HOST)),
    })
    .expect("valid configuration")
}

async fn invoke<B: FeaturesBackend>(gateway: &Gateway, backend: &B, payload: Value) -> ResponseEnvelope {
    let event = LambdaEvent::new(payload, Context::default());
    handler(gateway, backend, event)
        .await
        .expect("handler should succeed")
}

// ==================== Routing Tests ====================

#[tokio::test]
async fn test_routes_limit_request_for_every_shape() {
    for shape in SHAPES {
        let gateway = gateway(shape, Separator::Hyphen, BodyEncoding::Object);
        let backend = RecordingBackend::default();
        let payload = sample_event(shape, "/base/my-collection/items/limit", json!({"limit": "10"}));

        let response = invoke(&gateway, &backend, payload).await;

        assert_eq!(response.status_code, 200, "shape {:?}", shape);
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        let request = &calls[0].request;
        assert_eq!(request.method, "GET");
        assert_eq!(request.route_parameters["collection"], "my-collection");
        assert_eq!(request.query_parameters["limit"], "10");
        assert_eq!(calls[0].handler, "LimitSchema/items_limit");
    }
}

#[tokio::test]
async fn test_simple_proxy_strips_platform_headers() {
    let gateway = gateway(EventShape::SimpleProxy, Separator::Hyphen, BodyEncoding::Object);
    let backend = RecordingBackend::default();
    let mut payload = sample_event(EventShape::SimpleProxy, "/base/c/items", json!(null));
    payload["headers"]["erroneous-header"] = json!("should-be-kept");

    invoke(&gateway, &backend, payload).await;

    let request = &backend.calls()[0].request;
    assert!(request.header("host").is_none());
    assert!(request.header("x-forwarded-for").is_none());
    assert!(request.header("accept").is_none());
    assert_eq!(request.header("erroneous-header"), Some("should-be-kept"));
    assert!(request.header("key").is_some());
    assert!(!request.route_parameters.contains_key("proxy"));
}

#[tokio::test]
async fn test_underscore_deployment_routes_underscore_suffixes() {
    let gateway = gateway(EventShape::CustomPath, Separator::Underscore, BodyEncoding::Object);
    let backend = RecordingBackend::default();
    let payload = sample_event(
        EventShape::CustomPath,
        "/base/multi-collection/items/limit_geom_col",
        json!({"collection": "lnd-fts-land,bld-fts-building"}),
    );

    let response = invoke(&gateway, &backend, payload).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(backend.calls()[0].handler, "LimitGeomColSchema/items_limit_geom_col");
    assert_eq!(
        backend.calls()[0].request.query_parameters["collection"],
        "lnd-fts-land,bld-fts-building"
    );
}

#[tokio::test]
async fn test_latest_collections_route() {
    let gateway = gateway(EventShape::CustomPath, Separator::Hyphen, BodyEncoding::Text);
    let backend = RecordingBackend::default();
    let payload = sample_event(
        EventShape::CustomPath,
        "/base/latest-collections/bld-fts-building",
        json!({}),
    );

    let response = invoke(&gateway, &backend, payload).await;

    assert_eq!(response.status_code, 200);
    assert!(response.body.is_string());
    assert!(response.body_json()["collections"].is_array());
    assert_eq!(backend.calls()[0].collection.as_deref(), Some("bld-fts-building"));
}

// ==================== Error Tests ====================

#[tokio::test]
async fn test_unknown_extension_is_not_found() {
    let path = "/base/my-collection/items/unknown-ext";
    for shape in SHAPES {
        let gateway = gateway(shape, Separator::Hyphen, BodyEncoding::Object);
        let backend = RecordingBackend::default();

        let response = invoke(&gateway, &backend, sample_event(shape, path, json!({}))).await;

        assert_eq!(response.status_code, 404);
        assert_eq!(response.body["error"], "Not Found");
        assert!(response.body["message"].as_str().unwrap().contains(path));
        assert!(backend.calls().is_empty());
    }
}

#[tokio::test]
async fn test_domain_failure_never_leaks_internal_text() {
    let gateway = gateway(EventShape::SimpleProxy, Separator::Hyphen, BodyEncoding::Text);
    let payload = sample_event(EventShape::SimpleProxy, "/base/c/items/geom", json!({}));

    let response = invoke(&gateway, &FailingBackend, payload).await;

    assert_eq!(response.status_code, 500);
    let body = response.body_json();
    assert_eq!(body["message"], GENERIC_ERROR_MESSAGE);
    assert!(!response.body.to_string().contains(FailingBackend::SECRET));
}

#[tokio::test]
async fn test_detached_backend_renders_generic_error() {
    let gateway = gateway(EventShape::CustomPath, Separator::Hyphen, BodyEncoding::Object);
    let payload = sample_event(EventShape::CustomPath, "/base/c/items", json!({}));

    let response = invoke(&gateway, &DetachedBackend, payload).await;

    assert_eq!(response.status_code, 500);
    assert_eq!(response.body["message"], GENERIC_ERROR_MESSAGE);
    assert!(!response.body.to_string().contains("domain layer"));
}

// ==================== Wire Format Tests ====================

#[tokio::test]
async fn test_response_serializes_to_platform_envelope() {
    let gateway = gateway(EventShape::CustomPath, Separator::Hyphen, BodyEncoding::Object);
    let backend = RecordingBackend::default();
    let payload = sample_event(EventShape::CustomPath, "/base/c/items/col", json!({}));

    let response = invoke(&gateway, &backend, payload).await;
    let wire = serde_json::to_value(&response).unwrap();

    assert_eq!(wire["isBase64Encoded"], false);
    assert_eq!(wire["statusCode"], 200);
    assert_eq!(wire["headers"]["Content-Type"], "application/json");
    assert_eq!(wire["body"]["query"], "items_col");
    assert!(wire["body"].get("code").is_none());
}

#[tokio::test]
async fn test_request_id_is_attached_to_error_bodies() {
    let gateway = gateway(EventShape::CustomPath, Separator::Hyphen, BodyEncoding::Object);
    let mut context = Context::default();
    context.request_id = mock_request_id("404");
    let payload = sample_event(EventShape::CustomPath, "/nowhere", json!({}));

    let response = handler(&gateway, &DetachedBackend, LambdaEvent::new(payload, context))
        .await
        .expect("handler should succeed");

    assert_eq!(response.status_code, 404);
    assert_eq!(response.body["requestId"], "test-request-404");
}
