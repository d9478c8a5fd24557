use axum::{
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use quickie_core::config::{CorsConfig, CorsMode};
use std::net::SocketAddr;
use tokio::sync::broadcast;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{chat_handler, history_handler, root_handler};
use crate::state::AppState;

/// Build the application router with CORS and request tracing applied
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(&state.config.cors, state.resolver.header_name())?;

    Ok(Router::new()
        .route("/", get(root_handler))
        .route("/chat", post(chat_handler))
        .route("/chat/history", get(history_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Cross-origin policy.
///
/// Both modes allow credentials so the session cookie travels with
/// cross-site requests; the permissive mode therefore mirrors the caller's
/// origin instead of answering `*`.
pub fn cors_layer(config: &CorsConfig, session_header: &str) -> anyhow::Result<CorsLayer> {
    match config.mode {
        CorsMode::Permissive => Ok(CorsLayer::very_permissive()),
        CorsMode::Restrictive => {
            let origin = HeaderValue::from_str(config.allowed_origin.trim()).map_err(|e| {
                anyhow::anyhow!("invalid cors.allowed_origin '{}': {}", config.allowed_origin, e)
            })?;
            let session_header = HeaderName::from_bytes(session_header.as_bytes())?;

            Ok(CorsLayer::new()
                .allow_origin(AllowOrigin::list([origin]))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE, session_header])
                .allow_credentials(true))
        }
    }
}

pub async fn run_server(
    state: AppState,
    addr: SocketAddr,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let app = build_router(state)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            tracing::info!("Server shutting down signal received");
        })
        .await?;

    Ok(())
}
