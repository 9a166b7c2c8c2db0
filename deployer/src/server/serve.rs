//! HTTP server setup

use std::any::Any;
use std::future::Future;
use std::sync::Arc;

use axum::{
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::errors::HookError;
use crate::server::handlers::{
    index_handler, internal_error_response, version_handler, webhook_handler,
};
use crate::server::state::ServerState;

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        // Liveness and version
        .route("/", get(index_handler))
        .route("/version", get(version_handler))
        // Source-control webhook
        .route("/webhook", post(webhook_handler))
        // State and middleware
        .with_state(state)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    error!("Handler panicked: {}", detail);
    internal_error_response()
}

/// Start the HTTP server
pub async fn serve(
    addr: &str,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), HookError>>, HookError> {
    let app = router(state);

    info!("Webhook server listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| HookError::ServerError(format!("Failed to bind {}: {}", addr, e)))?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| HookError::ServerError(e.to_string()))
    });

    Ok(handle)
}
