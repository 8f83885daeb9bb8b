//! Visitor counter service.
//!
//! One in-memory tally behind `GET /api/visitors` (read) and
//! `POST /api/visitors` (count a new visitor). The tally starts a fresh window
//! every 24 hours and is lost on restart.

use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub mod error;
pub mod routes;
pub mod state;

use routes::{fallback_handler, visitors_get_handler, visitors_post_handler};
use state::State;

pub const VISITORS_PATH: &str = "/api/visitors";

pub fn router(state: Arc<State>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(VISITORS_PATH, get(visitors_get_handler).post(visitors_post_handler))
        .fallback(fallback_handler)
        .layer(cors)
        .with_state(state)
}

pub async fn start_server(port: u16) -> io::Result<()> {
    info!("Initializing state...");
    let state = State::new();

    let address = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Binding to {address}");

    let listener = TcpListener::bind(address).await?;
    info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
