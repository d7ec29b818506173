use crate::integration::init_tracing;
use crate::utils::{TestClient, spawn_server};
use peerdrop_core::{ClientSignal, PeerId, ServerSignal};
use std::time::Duration;

// A negotiation message for a member that is not connected is silently
// dropped; the sender's connection stays usable.
#[tokio::test]
async fn test_unknown_target_is_dropped() {
    init_tracing();
    let addr = spawn_server().await;

    let mut client = TestClient::connect(addr).await.expect("connect");
    client.join("LONELY").await.expect("join");
    client.next_signal().await.expect("all-users");

    client
        .send(&ClientSignal::Offer {
            offer: "v=0 nobody-home".into(),
            target: PeerId::new(),
        })
        .await
        .expect("send offer");

    client
        .expect_silence(Duration::from_millis(300))
        .await
        .expect("no error or echo expected");

    // Connection still works: a fresh peer joining is announced normally.
    let mut other = TestClient::connect(addr).await.expect("connect other");
    other.join("LONELY").await.expect("join other");
    other.next_signal().await.expect("all-users for other");

    match client.next_signal().await.expect("user-joined") {
        ServerSignal::UserJoined { peer_id } => assert_eq!(peer_id, other.peer_id),
        other => panic!("expected user-joined, got {other:?}"),
    }

    client.close().await.expect("close");
    other.close().await.expect("close other");
}

// Malformed client signals are logged and ignored, never fatal.
#[tokio::test]
async fn test_malformed_signal_does_not_kill_connection() {
    init_tracing();
    let addr = spawn_server().await;

    let mut client = TestClient::connect(addr).await.expect("connect");
    client.send_raw_text("{\"op\":\"nonsense\"}").await.expect("send garbage");
    client.join("STILLOK").await.expect("join");

    match client.next_signal().await.expect("all-users") {
        ServerSignal::AllUsers { peers } => assert!(peers.is_empty()),
        other => panic!("expected all-users, got {other:?}"),
    }

    client.close().await.expect("close");
}
