use crate::integration::init_tracing;
use crate::utils::{TestClient, spawn_server};
use peerdrop_core::ServerSignal;

// Scenario E: X drops its connection; Y is told and stays in the room.
#[tokio::test]
async fn test_disconnect_notifies_remaining() {
    init_tracing();
    let addr = spawn_server().await;

    let mut x = TestClient::connect(addr).await.expect("connect x");
    x.join("ABC123").await.expect("join x");
    x.next_signal().await.expect("all-users for x");

    let mut y = TestClient::connect(addr).await.expect("connect y");
    y.join("ABC123").await.expect("join y");
    y.next_signal().await.expect("all-users for y");
    x.next_signal().await.expect("user-joined for x");

    let gone = x.peer_id.clone();
    x.close().await.expect("close x");

    match y.next_signal().await.expect("user-disconnected for y") {
        ServerSignal::UserDisconnected { peer_id } => assert_eq!(peer_id, gone),
        other => panic!("expected user-disconnected, got {other:?}"),
    }

    // The room survived with Y as its only member: a fresh joiner sees
    // exactly [Y].
    let mut z = TestClient::connect(addr).await.expect("connect z");
    z.join("ABC123").await.expect("join z");
    match z.next_signal().await.expect("all-users for z") {
        ServerSignal::AllUsers { peers } => assert_eq!(peers, vec![y.peer_id.clone()]),
        other => panic!("expected all-users, got {other:?}"),
    }

    y.close().await.expect("close y");
    z.close().await.expect("close z");
}
