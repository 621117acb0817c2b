mod routes;
mod state;

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::routes::AppState;
use crate::state::Registry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beacon_server=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("BEACON_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("BEACON_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    let state = AppState {
        registry: Registry::new(),
        started_at: Instant::now(),
    };

    let app = Router::new()
        .route("/", get(routes::index))
        .route("/register-device", post(routes::register_device))
        .route("/devices", get(routes::list_devices))
        .route("/send-notification", post(routes::send_notification))
        .route("/send-topic-notification", post(routes::send_topic_notification))
        .route("/simulate-call", post(routes::simulate_call))
        .route("/notifications", get(routes::get_history))
        .route("/notifications", delete(routes::clear_history))
        .route("/health", get(routes::health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Beacon demo backend listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
