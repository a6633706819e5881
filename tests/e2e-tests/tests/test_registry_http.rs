//! Registry HTTP API round trips through a real socket and `HttpClient`.

use e2e_tests::assertions::{assert_empty_body, assert_error_response, assert_service_record};
use e2e_tests::TestRegistry;
use serde_json::json;
use svcreg_common::ServiceID;
use svcreg_http::StatusCode;
use svcreg_registry::ServiceEndpoint;

#[tokio::test]
async fn test_register_service() {
    let registry = TestRegistry::start().await;

    let body = json!({ "name": "svcA", "host": "localhost", "port": 4000 });
    let response = registry
        .client()
        .post(&registry.url("/services"), Some(&body))
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::CREATED);
    let record = response.data.as_json().expect("JSON body");
    assert_service_record(record, "svcA", "localhost", 4000).unwrap();
    assert_eq!(registry.registry().count(), 1);

    registry.stop().await;
}

#[tokio::test]
async fn test_find_without_name() {
    let registry = TestRegistry::start().await;

    let response = registry
        .client()
        .get(&registry.url("/services/find"))
        .await
        .unwrap();

    assert_error_response(&response, StatusCode::BAD_REQUEST, "Missing name parameter").unwrap();

    registry.stop().await;
}

#[tokio::test]
async fn test_delete_then_delete_again() {
    let registry = TestRegistry::start().await;
    let client = registry.client();

    let body = json!({ "name": "svcA", "host": "localhost", "port": 4000 });
    let created = client.post(&registry.url("/services"), Some(&body)).await.unwrap();
    assert_eq!(created.status, StatusCode::CREATED);

    let url = registry.url("/services?id=svcA-localhost-4000");

    let response = client.delete(&url).await.unwrap();
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_empty_body(&response).unwrap();
    assert!(registry.registry().find_by_name("svcA").is_empty());

    let response = client.delete(&url).await.unwrap();
    assert_error_response(&response, StatusCode::NOT_FOUND, "Service not found").unwrap();

    registry.stop().await;
}

#[tokio::test]
async fn test_register_missing_parameters() {
    let registry = TestRegistry::start().await;

    let response = registry
        .client()
        .post(&registry.url("/services"), Some(&json!({ "name": "svcA" })))
        .await
        .unwrap();

    assert_error_response(&response, StatusCode::BAD_REQUEST, "Missing required parameters").unwrap();
    assert_eq!(registry.registry().count(), 0);

    registry.stop().await;
}

#[tokio::test]
async fn test_list_services() {
    let registry = TestRegistry::start_with(vec![
        ServiceEndpoint::new("demoService1", "localhost", 4001),
        ServiceEndpoint::new("demoService2", "localhost", 4002),
    ])
    .await;

    let response = registry.client().get(&registry.url("/services")).await.unwrap();

    assert_eq!(response.status, StatusCode::OK);
    let services = response.data.as_json().and_then(|v| v.as_object()).expect("JSON object");
    assert_eq!(services.len(), 2);
    assert_service_record(&services["demoService1-localhost-4001"], "demoService1", "localhost", 4001).unwrap();
    assert_service_record(&services["demoService2-localhost-4002"], "demoService2", "localhost", 4002).unwrap();

    registry.stop().await;
}

#[tokio::test]
async fn test_find_by_name() {
    let registry = TestRegistry::start_with(vec![
        ServiceEndpoint::new("testService1", "localhost", 5001),
        ServiceEndpoint::new("testService2", "localhost", 5002),
        ServiceEndpoint::new("testService1", "127.0.0.1", 5003),
    ])
    .await;

    let response = registry
        .client()
        .get(&registry.url("/services/find?name=testService1"))
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::OK);
    let found = response.data.as_json().and_then(|v| v.as_array()).expect("JSON array");
    assert_eq!(found.len(), 2);
    assert!(found.iter().all(|s| s["name"] == "testService1"));

    let response = registry
        .client()
        .get(&registry.url("/services/find?name=unknown"))
        .await
        .unwrap();
    assert_eq!(response.data.as_json(), Some(&json!([])));

    registry.stop().await;
}

#[tokio::test]
async fn test_reregister_replaces_record() {
    let registry = TestRegistry::start().await;
    let client = registry.client();
    let body = json!({ "name": "svcA", "host": "localhost", "port": 4000 });

    let first = client.post(&registry.url("/services"), Some(&body)).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = client.post(&registry.url("/services"), Some(&body)).await.unwrap();

    assert_eq!(registry.registry().count(), 1);
    let first_ts = first.data.as_json().unwrap()["timestamp"].as_i64().unwrap();
    let second_ts = second.data.as_json().unwrap()["timestamp"].as_i64().unwrap();
    assert!(second_ts > first_ts);

    let stored = registry
        .registry()
        .get(&ServiceID::from("svcA-localhost-4000"))
        .unwrap();
    assert_eq!(stored.timestamp, second_ts);

    registry.stop().await;
}

#[tokio::test]
async fn test_registry_changes_visible_over_http() {
    let registry = TestRegistry::start().await;

    // Mutations through the registry handle show up over HTTP and vice versa
    registry.registry().register("direct", "localhost", 7000);
    let response = registry
        .client()
        .get(&registry.url("/services/find?name=direct"))
        .await
        .unwrap();
    assert_eq!(response.data.as_json().and_then(|v| v.as_array()).map(Vec::len), Some(1));

    let response = registry
        .client()
        .delete(&registry.url("/services?id=direct-localhost-7000"))
        .await
        .unwrap();
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert_eq!(registry.registry().count(), 0);

    registry.stop().await;
}
