use crate::config::ClientConfig;
use crate::session::{ChannelData, SessionEvent};
use crate::transport::DATA_CHANNEL_LABEL;
use anyhow::{Context, Result};
use bytes::Bytes;
use peerdrop_core::PeerId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// One peer connection towards one remote member. All transport callbacks
/// are forwarded as typed events into the orchestrator's queue; nothing is
/// mutated from inside a callback.
pub struct PeerConnection {
    remote: PeerId,
    pc: Arc<RTCPeerConnection>,
    event_tx: mpsc::Sender<SessionEvent>,
}

impl PeerConnection {
    pub async fn new(
        remote: PeerId,
        config: &ClientConfig,
        event_tx: mpsc::Sender<SessionEvent>,
    ) -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = if config.ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: config.ice_servers.clone(),
                ..Default::default()
            }]
        };
        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let pc = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = event_tx.clone();
        let remote_state = remote.clone();
        pc.on_peer_connection_state_change(Box::new(move |s: RTCPeerConnectionState| {
            let tx = state_tx.clone();
            let remote = remote_state.clone();

            Box::pin(async move {
                info!(peer = %remote, state = ?s, "Peer connection state changed");
                match s {
                    RTCPeerConnectionState::Connected => {
                        let _ = tx.send(SessionEvent::Connected(remote)).await;
                    }
                    RTCPeerConnectionState::Failed
                    | RTCPeerConnectionState::Disconnected
                    | RTCPeerConnectionState::Closed => {
                        let _ = tx.send(SessionEvent::Disconnected(remote)).await;
                    }
                    _ => {}
                }
            })
        }));

        let ice_tx = event_tx.clone();
        let remote_ice = remote.clone();
        pc.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let remote = remote_ice.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let Ok(json) = serde_json::to_string(&init) else {
                    return;
                };
                let _ = tx
                    .send(SessionEvent::CandidateGenerated(remote, json))
                    .await;
            })
        }));

        // Answerer side: the offerer created the channel, it shows up here.
        let dc_tx = event_tx.clone();
        let remote_dc = remote.clone();
        pc.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();
            let remote = remote_dc.clone();

            Box::pin(async move {
                debug!(peer = %remote, label = %dc.label(), "Remote data channel received");
                register_channel(&dc, remote, tx);
            })
        }));

        Ok(Self {
            remote,
            pc,
            event_tx,
        })
    }

    /// Offerer side: create the (ordered, reliable) data channel before the
    /// offer so it is part of the negotiated session.
    pub async fn create_data_channel(&self) -> Result<Arc<RTCDataChannel>> {
        let init = RTCDataChannelInit {
            ordered: Some(true),
            ..Default::default()
        };
        let dc = self
            .pc
            .create_data_channel(DATA_CHANNEL_LABEL, Some(init))
            .await
            .context("failed to create data channel")?;

        register_channel(&dc, self.remote.clone(), self.event_tx.clone());
        Ok(dc)
    }

    pub async fn create_offer(&self) -> Result<String> {
        let offer = self.pc.create_offer(None).await?;
        self.pc.set_local_description(offer.clone()).await?;
        Ok(offer.sdp)
    }

    /// Apply a remote offer and produce the local answer.
    pub async fn accept_offer(&self, sdp: String) -> Result<String> {
        let offer = RTCSessionDescription::offer(sdp)?;
        self.pc.set_remote_description(offer).await?;

        let answer = self.pc.create_answer(None).await?;
        self.pc.set_local_description(answer.clone()).await?;
        Ok(answer.sdp)
    }

    pub async fn apply_answer(&self, sdp: String) -> Result<()> {
        let answer = RTCSessionDescription::answer(sdp)?;
        self.pc.set_remote_description(answer).await?;
        Ok(())
    }

    pub async fn add_ice_candidate(&self, candidate_json: &str) -> Result<()> {
        let init: RTCIceCandidateInit =
            serde_json::from_str(candidate_json).context("failed to parse ICE candidate")?;
        self.pc.add_ice_candidate(init).await?;
        Ok(())
    }

    pub async fn close(&self) -> Result<()> {
        self.pc.close().await?;
        Ok(())
    }
}

/// Wire a channel's open/message callbacks to the event queue. Used for
/// both locally created (offerer) and remotely announced (answerer)
/// channels.
fn register_channel(dc: &Arc<RTCDataChannel>, remote: PeerId, tx: mpsc::Sender<SessionEvent>) {
    let open_dc = Arc::clone(dc);
    let open_tx = tx.clone();
    let open_remote = remote.clone();
    dc.on_open(Box::new(move || {
        let tx = open_tx.clone();
        let remote = open_remote.clone();
        let dc = Arc::clone(&open_dc);

        Box::pin(async move {
            info!(peer = %remote, "Data channel open");
            let _ = tx.send(SessionEvent::ChannelOpen(remote, dc)).await;
        })
    }));

    let msg_remote = remote;
    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = tx.clone();
        let remote = msg_remote.clone();

        Box::pin(async move {
            let data = if msg.is_string {
                match String::from_utf8(msg.data.to_vec()) {
                    Ok(text) => ChannelData::Text(text),
                    Err(_) => {
                        debug!(peer = %remote, "Dropping non-UTF-8 text frame");
                        return;
                    }
                }
            } else {
                ChannelData::Binary(Bytes::from(msg.data.to_vec()))
            };
            let _ = tx.send(SessionEvent::ChannelMessage(remote, data)).await;
        })
    }));
}
