//! Many clients hitting one registry at the same time.

use e2e_tests::TestRegistry;
use futures::future::join_all;
use serde_json::json;
use svcreg_http::StatusCode;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations() {
    let registry = TestRegistry::start().await;
    let url = registry.url("/services");

    let requests = (0..50u16).map(|i| {
        let client = registry.client().clone();
        let url = url.clone();
        async move {
            let body = json!({ "name": "worker", "host": "localhost", "port": 9000 + i });
            client.post(&url, Some(&body)).await
        }
    });

    for result in join_all(requests).await {
        assert_eq!(result.unwrap().status, StatusCode::CREATED);
    }

    assert_eq!(registry.registry().count(), 50);
    assert_eq!(registry.registry().find_by_name("worker").len(), 50);

    registry.stop().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_unregister_succeeds_once() {
    let registry = TestRegistry::start().await;
    registry.registry().register("svcA", "localhost", 4000);
    let url = registry.url("/services?id=svcA-localhost-4000");

    let requests = (0..10).map(|_| {
        let client = registry.client().clone();
        let url = url.clone();
        async move { client.delete(&url).await }
    });

    let statuses: Vec<StatusCode> = join_all(requests)
        .await
        .into_iter()
        .map(|result| result.unwrap().status)
        .collect();

    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::NO_CONTENT).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::NOT_FOUND).count(), 9);

    registry.stop().await;
}
