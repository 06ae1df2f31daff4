use axum::{
    routing::{get, post},
    Router,
};
use std::env;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod proposer;
mod routes;

const DEFAULT_ADDR: &str = "0.0.0.0:5000";

pub fn app() -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/ai-move", post(routes::ai_move))
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr = env::var("CHESS_SERVER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!(%addr, "move server listening");

    if let Err(e) = axum::serve(listener, app()).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
