//! HTTP API over the hospital catalog.

mod handlers;
mod state;

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/hospitals/nearby", get(handlers::nearby))
        .route("/api/hospitals/search", get(handlers::search))
        .route("/api/hospitals/{id}", get(handlers::detail))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

pub async fn start(host: &str, port: u16, state: AppState) -> std::io::Result<()> {
    let hospitals = state.catalog.len();
    let app = build_router(state);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(%addr, hospitals, "hospital finder listening");
    eprintln!("  Hospital finder listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app).await
}
