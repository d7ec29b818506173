mod test_client;

pub use test_client::TestClient;

use peerdrop_server::{AppState, router};
use std::net::SocketAddr;

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
