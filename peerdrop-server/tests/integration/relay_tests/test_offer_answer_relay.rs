use crate::integration::init_tracing;
use crate::utils::{TestClient, spawn_server};
use peerdrop_core::{ClientSignal, ServerSignal};

// Scenario C: offer and answer are relayed verbatim to the addressed
// member, each stamped with the true sender id.
#[tokio::test]
async fn test_offer_answer_relay() {
    init_tracing();
    let addr = spawn_server().await;

    let mut x = TestClient::connect(addr).await.expect("connect x");
    x.join("NEGO01").await.expect("join x");
    x.next_signal().await.expect("all-users for x");

    let mut y = TestClient::connect(addr).await.expect("connect y");
    y.join("NEGO01").await.expect("join y");
    y.next_signal().await.expect("all-users for y");
    x.next_signal().await.expect("user-joined for x");

    x.send(&ClientSignal::Offer {
        offer: "v=0 fake-sdp-offer".into(),
        target: y.peer_id.clone(),
    })
    .await
    .expect("send offer");

    match y.next_signal().await.expect("offer for y") {
        ServerSignal::Offer { offer, sender } => {
            assert_eq!(offer, "v=0 fake-sdp-offer");
            assert_eq!(sender, x.peer_id);
        }
        other => panic!("expected offer, got {other:?}"),
    }

    y.send(&ClientSignal::Answer {
        answer: "v=0 fake-sdp-answer".into(),
        target: x.peer_id.clone(),
    })
    .await
    .expect("send answer");

    match x.next_signal().await.expect("answer for x") {
        ServerSignal::Answer { answer, sender } => {
            assert_eq!(answer, "v=0 fake-sdp-answer");
            assert_eq!(sender, y.peer_id);
        }
        other => panic!("expected answer, got {other:?}"),
    }

    x.send(&ClientSignal::IceCandidate {
        candidate: "{\"candidate\":\"candidate:0 1 UDP 1 127.0.0.1 9 typ host\"}".into(),
        target: y.peer_id.clone(),
    })
    .await
    .expect("send candidate");

    match y.next_signal().await.expect("candidate for y") {
        ServerSignal::IceCandidate { sender, .. } => assert_eq!(sender, x.peer_id),
        other => panic!("expected ice-candidate, got {other:?}"),
    }

    x.close().await.expect("close x");
    y.close().await.expect("close y");
}
