use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use peerdrop_client::{ClientConfig, ConnectionState, PeerDropClient};
use peerdrop_core::{TransferDirection, TransferId, TransferStatus};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "peerdrop")]
#[command(about = "Room-based peer-to-peer file sharing over WebRTC")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling server.
    Serve {
        #[arg(long, default_value_t = 3001)]
        port: u16,
    },

    /// Join a room; optionally send a file to everyone in it. Completed
    /// incoming files are saved into the output directory.
    Join {
        /// Room code, case-insensitive.
        room: String,

        #[arg(long, default_value = "http://127.0.0.1:3001")]
        server: String,

        /// File to send once a peer connects.
        #[arg(long)]
        send: Option<PathBuf>,

        /// Directory for received files.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match Cli::parse().command {
        Commands::Serve { port } => {
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            println!("{}", format!("📡 Signaling server on {addr}").green().bold());
            peerdrop_server::serve(addr).await
        }
        Commands::Join {
            room,
            server,
            send,
            out,
        } => join(room, server, send, out).await,
    }
}

async fn join(room: String, server: String, send: Option<PathBuf>, out: PathBuf) -> Result<()> {
    let config = ClientConfig::new(server);
    let client = PeerDropClient::connect(config)
        .await
        .context("could not reach the signaling server")?;
    client.join_room(&room)?;
    println!(
        "{}",
        format!("🚪 Joined room {}", room.trim().to_uppercase())
            .cyan()
            .bold()
    );
    println!("   Press Ctrl-C to leave.");

    let mut peers_seen = 0usize;
    let mut announced: HashSet<TransferId> = HashSet::new();
    let mut saved: HashSet<TransferId> = HashSet::new();
    let mut sent = send.is_none();
    let mut ticker = tokio::time::interval(Duration::from_millis(250));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {}
        }

        let status = client.status();
        if status.state == ConnectionState::Failed {
            let reason = status.error.unwrap_or_else(|| "unknown".to_owned());
            println!("{}", format!("❌ Connection failed: {reason}").red().bold());
            break;
        }

        let peers = client.connected_peers();
        if peers.len() != peers_seen {
            println!("{}", format!("👥 {} peer(s) connected", peers.len()).cyan());
            peers_seen = peers.len();
        }

        if !sent && !peers.is_empty() {
            // Give the data channels a moment to open after the first peer.
            tokio::time::sleep(Duration::from_secs(1)).await;
            if let Some(path) = &send {
                client.send_file(path.clone())?;
                println!(
                    "{}",
                    format!("📤 Sending {}", path.display()).green().bold()
                );
            }
            sent = true;
        }

        for transfer in client.incoming().into_iter().chain(client.outgoing()) {
            if announced.insert(transfer.id.clone()) && transfer.direction == TransferDirection::Incoming {
                println!(
                    "{}",
                    format!("📥 Receiving {} ({} bytes)", transfer.name, transfer.size).cyan()
                );
            }
            match transfer.status {
                TransferStatus::Completed if saved.insert(transfer.id.clone()) => {
                    if transfer.direction == TransferDirection::Incoming {
                        let target = out.join(&transfer.name);
                        let payload = client
                            .completed_payload(&transfer.id)
                            .context("completed transfer has no payload")?;
                        tokio::fs::write(&target, &payload).await?;
                        println!(
                            "{}",
                            format!("✨ Saved {} ({} bytes)", target.display(), payload.len())
                                .green()
                                .bold()
                        );
                    } else {
                        println!(
                            "{}",
                            format!("✨ Sent {} to {} peer(s)", transfer.name, peers_seen)
                                .green()
                                .bold()
                        );
                    }
                }
                TransferStatus::Failed if saved.insert(transfer.id.clone()) => {
                    println!("{}", format!("❌ Transfer {} failed", transfer.name).red());
                }
                _ => {}
            }
        }
    }

    client.shutdown().await;
    println!("{}", "👋 Left the room".cyan());
    Ok(())
}
