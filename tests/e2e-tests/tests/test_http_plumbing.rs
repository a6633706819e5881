//! Router and client behaviour that is not specific to the registry routes.

use e2e_tests::TestRegistry;
use serde_json::json;
use svcreg_common::Error;
use svcreg_http::{HttpClient, Method, RequestOptions, ResponseBody, StatusCode};

#[tokio::test]
async fn test_unknown_route_is_plain_404() {
    let registry = TestRegistry::start().await;
    let client = registry.client();

    for (method, path) in [
        (Method::GET, "/nothing-here"),
        (Method::GET, "/services/"),
        (Method::PUT, "/services"),
    ] {
        let response = client
            .request(RequestOptions::new(method.clone(), registry.url(path)), None)
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::NOT_FOUND, "{} {}", method, path);
        assert_eq!(response.data, ResponseBody::Text("Not Found".to_string()));
    }

    registry.stop().await;
}

#[tokio::test]
async fn test_malformed_request_body_treated_as_empty() {
    let registry = TestRegistry::start().await;

    // A JSON string payload is written verbatim, so this sends broken JSON
    let response = registry
        .client()
        .post(&registry.url("/services"), Some(&json!("{\"name\": \"svcA\",")))
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.data.as_json(),
        Some(&json!({ "error": "Missing required parameters" }))
    );

    registry.stop().await;
}

#[tokio::test]
async fn test_query_values_are_decoded() {
    let registry = TestRegistry::start().await;
    registry.registry().register("my svc", "localhost", 4000);

    let response = registry
        .client()
        .get(&registry.url("/services/find?name=my%20svc"))
        .await
        .unwrap();
    assert_eq!(response.data.as_json().and_then(|v| v.as_array()).map(Vec::len), Some(1));

    let response = registry
        .client()
        .delete(&registry.url("/services?id=my%20svc-localhost-4000"))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    registry.stop().await;
}

#[tokio::test]
async fn test_custom_headers_are_sent() {
    let registry = TestRegistry::start().await;

    let options = RequestOptions::new(Method::POST, registry.url("/services"))
        .with_header("Content-Type", "application/json; charset=utf-8")
        .with_header("X-Request-Id", "e2e-1");
    let body = json!({ "name": "svcH", "host": "localhost", "port": 4100 });

    let response = registry.client().request(options, Some(&body)).await.unwrap();
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.headers["content-type"], "application/json");

    registry.stop().await;
}

#[tokio::test]
async fn test_stopped_server_refuses_connections() {
    let registry = TestRegistry::start().await;
    let url = registry.url("/services");
    registry.stop().await;

    let result = HttpClient::new().get(&url).await;
    assert!(matches!(result, Err(Error::Transport(_))), "got {:?}", result.map(|r| r.status));
}

#[tokio::test]
async fn test_stop_closes_kept_alive_connections() {
    let registry = TestRegistry::start().await;
    let client = registry.client().clone();
    let services = registry.url("/services");
    let inner = std::sync::Arc::clone(registry.registry());

    // Leaves a pooled keep-alive connection behind
    let response = client.get(&services).await.unwrap();
    assert_eq!(response.status, StatusCode::OK);

    registry.stop().await;
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let body = json!({ "name": "ghost", "host": "h", "port": 1 });
    let result = client.post(&services, Some(&body)).await;

    assert!(matches!(result, Err(Error::Transport(_))), "got {:?}", result.map(|r| r.status));
    assert_eq!(inner.count(), 0);
}

#[tokio::test]
async fn test_https_is_rejected_before_connecting() {
    let result = HttpClient::new().get("https://127.0.0.1:1/services").await;
    assert!(matches!(result, Err(Error::UnsupportedScheme { .. })));
}
