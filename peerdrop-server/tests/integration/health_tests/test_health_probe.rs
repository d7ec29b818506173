use crate::integration::init_tracing;
use crate::utils::{TestClient, spawn_server};

// Scenario F: /health answers 200 {"status":"ok"} no matter what the room
// state looks like.
#[tokio::test]
async fn test_health_probe() {
    init_tracing();
    let addr = spawn_server().await;

    let body: serde_json::Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .expect("health request")
        .error_for_status()
        .expect("200 expected")
        .json()
        .await
        .expect("json body");

    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());

    // Still ok with rooms active.
    let mut client = TestClient::connect(addr).await.expect("connect");
    client.join("HEALTH1").await.expect("join");
    client.next_signal().await.expect("all-users");

    let again: serde_json::Value = reqwest::get(format!("http://{addr}/health"))
        .await
        .expect("health request")
        .json()
        .await
        .expect("json body");
    assert_eq!(again["status"], "ok");

    client.close().await.expect("close");
}
