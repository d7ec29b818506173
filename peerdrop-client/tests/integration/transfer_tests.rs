use crate::integration::init_tracing;
use crate::utils::{spawn_server, temp_file};
use peerdrop_client::{ClientConfig, ClientError, ConnectionState, PeerDropClient};
use peerdrop_core::TransferStatus;
use std::time::Duration;

/// Poll `check` every 100 ms until it yields a value or `secs` elapse.
async fn wait_for<T>(secs: u64, mut check: impl FnMut() -> Option<T>) -> T {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(secs);
    loop {
        if let Some(value) = check() {
            return value;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within {secs}s"
        );
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

fn loopback_config(addr: std::net::SocketAddr) -> ClientConfig {
    ClientConfig {
        server_url: format!("http://{addr}"),
        // Host candidates are enough on loopback.
        ice_servers: vec![],
        ..ClientConfig::default()
    }
}

#[tokio::test]
async fn connect_fails_when_service_unreachable() {
    init_tracing();

    // Bind then drop, so the port is known-closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig {
        server_url: format!("http://{addr}"),
        connect_attempts: 1,
        connect_retry_delay: Duration::from_millis(10),
        ..ClientConfig::default()
    };
    let err = PeerDropClient::connect(config).await.err().expect("error");
    assert!(matches!(err, ClientError::Connect(_)));
}

#[tokio::test]
async fn two_clients_exchange_a_megabyte_file() {
    init_tracing();
    let addr = spawn_server().await;

    let sender = PeerDropClient::connect(loopback_config(addr))
        .await
        .expect("sender connects");
    let receiver = PeerDropClient::connect(loopback_config(addr))
        .await
        .expect("receiver connects");

    sender.join_room("demo").unwrap();
    // Let the first member settle in the room before the second joins.
    tokio::time::sleep(Duration::from_millis(200)).await;
    receiver.join_room("DEMO").unwrap();

    wait_for(20, || (!sender.connected_peers().is_empty()).then_some(())).await;
    wait_for(20, || (!receiver.connected_peers().is_empty()).then_some(())).await;
    assert_eq!(receiver.status().state, ConnectionState::Connected);

    // The channel opens moments after the connection reports up.
    tokio::time::sleep(Duration::from_secs(2)).await;

    let data: Vec<u8> = (0..1_000_000usize).map(|i| (i % 251) as u8).collect();
    let path = temp_file("payload.bin", &data).await;
    sender.send_file(&path).unwrap();

    let completed = wait_for(30, || {
        receiver
            .incoming()
            .into_iter()
            .find(|t| t.status == TransferStatus::Completed)
    })
    .await;
    assert_eq!(completed.size, 1_000_000);
    assert_eq!(completed.progress, 100);
    assert_eq!(completed.name, path.file_name().unwrap().to_string_lossy());

    let payload = receiver.completed_payload(&completed.id).expect("payload");
    assert_eq!(payload.len(), data.len());
    assert_eq!(&payload[..], &data[..]);

    let outgoing = wait_for(10, || {
        sender
            .outgoing()
            .into_iter()
            .find(|t| t.status == TransferStatus::Completed)
    })
    .await;
    assert_eq!(outgoing.progress, 100);

    let _ = tokio::fs::remove_file(&path).await;
    sender.shutdown().await;
    receiver.shutdown().await;
}
