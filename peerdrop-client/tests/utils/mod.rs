use peerdrop_server::{AppState, router};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Spawn a real signaling server on an ephemeral port; returns its address.
pub async fn spawn_server() -> SocketAddr {
    let app = router(AppState::new());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// Write `data` to a unique file in the temp directory and return its path.
pub async fn temp_file(name_hint: &str, data: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{}-{}", uuid::Uuid::new_v4(), name_hint));
    tokio::fs::write(&path, data).await.expect("write temp file");
    path
}
