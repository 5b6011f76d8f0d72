//! API server for the hostel management system
//!
//! This is the main entry point for the backend. It provides the REST
//! API on port 8081 and Socket.IO occupancy updates on port 8080.

mod routes;
mod session;
mod socket;
mod state;

use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::socket::{create_socket_layer, spawn_snapshot_forwarder, SocketState};
use crate::state::AppState;

fn env_port(var: &str, default: u16) -> u16 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_server=debug,tower_http=debug,socketioxide=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine data directory
    let data_dir = std::env::var("HOSTEL_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".hostel-data"));

    tracing::info!("Using data directory: {:?}", data_dir);

    // Admin uids seeded from the environment get the admin role on registration
    let admin_uids: Vec<String> = std::env::var("HOSTEL_ADMIN_UIDS")
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    // Create application state for REST API
    let app_state = AppState::new(data_dir.clone(), admin_uids)
        .await
        .expect("Failed to initialize application state");

    // Create Socket.IO layer and forward ledger commits to connected clients
    let socket_state = SocketState {
        ledger: app_state.ledger_arc(),
    };
    let (socket_layer, io) = create_socket_layer(socket_state);
    spawn_snapshot_forwarder(io, app_state.ledger_arc());

    // REST API server
    let rest_app = Router::new()
        .merge(routes::health::router())
        .merge(routes::auth::router())
        .merge(routes::users::router())
        .merge(routes::rooms::router())
        .merge(routes::requests::router())
        .merge(routes::maintenance::router())
        .merge(routes::entry_exit::router())
        .merge(routes::messages::router())
        .with_state(app_state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Socket.IO server
    // Layers are applied bottom-to-top, so CorsLayer is added last to be applied first
    let socket_app = Router::new()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(socket_layer);

    // Start both servers - bind to 0.0.0.0 for localhost/127.0.0.1 compatibility
    let rest_addr = SocketAddr::from(([0, 0, 0, 0], env_port("HOSTEL_REST_PORT", 8081)));
    let socket_addr = SocketAddr::from(([0, 0, 0, 0], env_port("HOSTEL_SOCKET_PORT", 8080)));

    tracing::info!("REST API listening on {}", rest_addr);
    tracing::info!("Socket.IO listening on {}", socket_addr);

    // Spawn REST server
    let rest_listener = tokio::net::TcpListener::bind(rest_addr).await.unwrap();
    let rest_handle = tokio::spawn(async move {
        axum::serve(rest_listener, rest_app).await.unwrap();
    });

    // Spawn Socket.IO server
    let socket_listener = tokio::net::TcpListener::bind(socket_addr).await.unwrap();
    let socket_handle = tokio::spawn(async move {
        axum::serve(socket_listener, socket_app).await.unwrap();
    });

    // Wait for both
    tokio::try_join!(rest_handle, socket_handle).unwrap();
}
