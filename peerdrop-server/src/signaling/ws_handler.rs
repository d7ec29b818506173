use crate::http::AppState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use peerdrop_core::{ClientSignal, PeerId, ServerSignal};
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    // Member ids are assigned here, one per connection, never client-chosen.
    let peer_id = PeerId::new();
    ws.on_upgrade(move |socket| handle_socket(socket, peer_id, state))
}

async fn handle_socket(socket: WebSocket, peer_id: PeerId, state: AppState) {
    info!(peer = %peer_id, "New signaling connection");

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.signaling.add_peer(peer_id.clone(), tx);
    state.signaling.send_signal(
        &peer_id,
        &ServerSignal::Welcome {
            peer_id: peer_id.clone(),
        },
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let state = state.clone();
        let peer_id = peer_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientSignal>(&text) {
                        Ok(ClientSignal::JoinRoom { room }) => {
                            state.registry.join(room, peer_id.clone()).await;
                        }
                        Ok(signal) => state.signaling.relay(&peer_id, signal),
                        Err(e) => warn!(peer = %peer_id, "Invalid signal: {e}"),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.registry.disconnect(&peer_id).await;
    state.signaling.remove_peer(&peer_id);
    info!(peer = %peer_id, "Signaling connection closed");
}
