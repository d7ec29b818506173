use crate::integration::init_tracing;
use crate::utils::{TestClient, spawn_server};
use peerdrop_core::ServerSignal;

// Scenario A: first join auto-creates the room and the joiner gets an
// empty member list.
#[tokio::test]
async fn test_first_join_creates_room() {
    init_tracing();
    let addr = spawn_server().await;

    let mut client = TestClient::connect(addr).await.expect("connect");
    client.join("ABC123").await.expect("join");

    match client.next_signal().await.expect("all-users") {
        ServerSignal::AllUsers { peers } => assert!(peers.is_empty()),
        other => panic!("expected all-users, got {other:?}"),
    }

    client.close().await.expect("close");
}

// Joining the same room twice is idempotent: no duplicate of the member
// shows up in a later joiner's member list.
#[tokio::test]
async fn test_rejoin_does_not_duplicate_member() {
    init_tracing();
    let addr = spawn_server().await;

    let mut first = TestClient::connect(addr).await.expect("connect");
    first.join("DUP1").await.expect("join");
    assert!(matches!(
        first.next_signal().await.expect("all-users"),
        ServerSignal::AllUsers { peers } if peers.is_empty()
    ));

    first.join("DUP1").await.expect("rejoin");
    assert!(matches!(
        first.next_signal().await.expect("all-users again"),
        ServerSignal::AllUsers { peers } if peers.is_empty()
    ));

    let mut second = TestClient::connect(addr).await.expect("connect");
    second.join("DUP1").await.expect("join");
    match second.next_signal().await.expect("all-users") {
        ServerSignal::AllUsers { peers } => {
            assert_eq!(peers, vec![first.peer_id.clone()]);
        }
        other => panic!("expected all-users, got {other:?}"),
    }

    first.close().await.expect("close");
    second.close().await.expect("close");
}

// Room ids are case-normalized: 'abc123' and 'ABC123' meet in one room.
#[tokio::test]
async fn test_room_ids_are_case_insensitive() {
    init_tracing();
    let addr = spawn_server().await;

    let mut upper = TestClient::connect(addr).await.expect("connect");
    upper.join("MIXED1").await.expect("join");
    upper.next_signal().await.expect("all-users");

    let mut lower = TestClient::connect(addr).await.expect("connect");
    lower.join("mixed1").await.expect("join");
    match lower.next_signal().await.expect("all-users") {
        ServerSignal::AllUsers { peers } => assert_eq!(peers, vec![upper.peer_id.clone()]),
        other => panic!("expected all-users, got {other:?}"),
    }

    upper.close().await.expect("close");
    lower.close().await.expect("close");
}
