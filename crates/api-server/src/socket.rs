//! Socket.IO push channel for occupancy updates
//!
//! Dashboards connect here and receive a full rooms-and-requests
//! snapshot whenever the ledger commits a change, so room vacancy
//! counts never go stale between page loads.

use std::sync::Arc;

use socketioxide::extract::{SocketRef, State};
use socketioxide::{SocketIo, TransportType};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use hostel_core::ledger::FileLedgerStore;

/// Shared state for Socket.IO handlers
#[derive(Clone)]
pub struct SocketState {
    pub ledger: Arc<FileLedgerStore>,
}

/// Handle new socket connection
pub async fn on_connect(socket: SocketRef, State(_state): State<SocketState>) {
    info!("Client connected: {}", socket.id);

    socket.on(
        "hostel:request-sync",
        |socket: SocketRef, State(state): State<SocketState>| async move {
            let snapshot = state.ledger.snapshot().await;
            if let Err(e) = socket.emit("hostel:sync", &snapshot) {
                warn!("Failed to emit sync to {}: {}", socket.id, e);
            }
        },
    );

    socket.on_disconnect(|socket: SocketRef| async move {
        info!("Client disconnected: {}", socket.id);
    });
}

/// Create and configure Socket.IO layer
pub fn create_socket_layer(state: SocketState) -> (socketioxide::layer::SocketIoLayer, SocketIo) {
    let (layer, io) = SocketIo::builder()
        .with_state(state)
        // Only allow WebSocket transport to avoid CORS issues with polling
        .transports([TransportType::Websocket])
        .build_layer();

    io.ns("/", on_connect);

    (layer, io)
}

/// Forward ledger snapshots to every connected client
///
/// Runs until the ledger store is dropped. A lagged receiver only means
/// intermediate snapshots were skipped; the next one is still complete,
/// so we keep going.
pub fn spawn_snapshot_forwarder(io: SocketIo, ledger: Arc<FileLedgerStore>) {
    let mut snapshots = ledger.subscribe();
    tokio::spawn(async move {
        loop {
            match snapshots.recv().await {
                Ok(snapshot) => {
                    if let Err(e) = io.emit("hostel:sync", &snapshot) {
                        warn!("Failed to broadcast snapshot: {}", e);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Snapshot forwarder lagged, skipped {} updates", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
