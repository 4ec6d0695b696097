//! Quince Server - Public JSON API.
//!
//! Serves the commerce domain over HTTP:
//!
//! - Axum web framework, JSON in and out
//! - In-process entity store with unit-of-work transactions
//! - Caller identity resolved by an upstream gateway and forwarded as
//!   trusted headers (see `middleware::auth`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use quince_commerce::Store;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quince_server::config::ServerConfig;
use quince_server::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter; defaults to info for our crates
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "quince_server=info,quince_commerce=info,tower_http=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Build application state around a fresh store
    let state = AppState::new(Store::new(), config.commerce.clone());
    let app = quince_server::app(state);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("quince server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
