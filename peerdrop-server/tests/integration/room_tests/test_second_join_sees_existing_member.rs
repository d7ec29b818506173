use crate::integration::init_tracing;
use crate::utils::{TestClient, spawn_server};
use peerdrop_core::ServerSignal;

// Scenario B: the second joiner receives the first member in its list and
// the first member is told about the newcomer.
#[tokio::test]
async fn test_second_join_sees_existing_member() {
    init_tracing();
    let addr = spawn_server().await;

    let mut x = TestClient::connect(addr).await.expect("connect x");
    x.join("ABC123").await.expect("join x");
    assert!(matches!(
        x.next_signal().await.expect("all-users for x"),
        ServerSignal::AllUsers { peers } if peers.is_empty()
    ));

    let mut y = TestClient::connect(addr).await.expect("connect y");
    y.join("ABC123").await.expect("join y");

    match y.next_signal().await.expect("all-users for y") {
        ServerSignal::AllUsers { peers } => assert_eq!(peers, vec![x.peer_id.clone()]),
        other => panic!("expected all-users, got {other:?}"),
    }

    match x.next_signal().await.expect("user-joined for x") {
        ServerSignal::UserJoined { peer_id } => assert_eq!(peer_id, y.peer_id),
        other => panic!("expected user-joined, got {other:?}"),
    }

    x.close().await.expect("close x");
    y.close().await.expect("close y");
}

// A member is in at most one room: switching rooms leaves the first one.
#[tokio::test]
async fn test_switching_rooms_leaves_the_first() {
    init_tracing();
    let addr = spawn_server().await;

    let mut a = TestClient::connect(addr).await.expect("connect a");
    a.join("ROOM-A").await.expect("join");
    a.next_signal().await.expect("all-users");

    let mut b = TestClient::connect(addr).await.expect("connect b");
    b.join("ROOM-A").await.expect("join");
    b.next_signal().await.expect("all-users");
    a.next_signal().await.expect("user-joined");

    // b moves to another room; a must see it leave.
    b.join("ROOM-B").await.expect("switch");
    match a.next_signal().await.expect("user-disconnected") {
        ServerSignal::UserDisconnected { peer_id } => assert_eq!(peer_id, b.peer_id),
        other => panic!("expected user-disconnected, got {other:?}"),
    }

    a.close().await.expect("close a");
    b.close().await.expect("close b");
}
