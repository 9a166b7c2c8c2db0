//! HTTP request handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::errors::HookError;
use crate::server::state::ServerState;
use crate::utils::version_info;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
pub const EVENT_HEADER: &str = "x-github-event";
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// Event type that triggers a deployment
pub const PUSH_EVENT: &str = "push";

/// Liveness handler
pub async fn index_handler() -> &'static str {
    "Webhook API is running"
}

/// Version response
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}

/// Result of processing one webhook delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Unauthorized,
    Ignored,
    Deployed,
    DeployFailed,
}

impl IntoResponse for WebhookOutcome {
    fn into_response(self) -> Response {
        match self {
            WebhookOutcome::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            WebhookOutcome::Ignored => (StatusCode::OK, "Event ignored"),
            WebhookOutcome::Deployed => (StatusCode::OK, "Deployment completed"),
            WebhookOutcome::DeployFailed => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Deployment failed")
            }
        }
        .into_response()
    }
}

/// Generic 500 response, never carries error details
pub fn internal_error_response() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

/// Webhook handler
pub async fn webhook_handler(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match process_webhook(&state, &headers, &body).await {
        Ok(outcome) => outcome.into_response(),
        Err(e) => {
            error!("Error processing webhook: {}", e);
            internal_error_response()
        }
    }
}

async fn process_webhook(
    state: &ServerState,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<WebhookOutcome, HookError> {
    if let Some(delivery) = header_str(headers, DELIVERY_HEADER) {
        debug!("Webhook delivery {} ({} bytes)", delivery, body.len());
    }

    // Signature covers the raw body, not re-serialized JSON
    let signature = header_str(headers, SIGNATURE_HEADER);
    if state.verifier.is_enabled() && signature.is_none() {
        warn!("Missing signature header, rejecting request");
        return Ok(WebhookOutcome::Unauthorized);
    }
    if !state.verifier.verify(body, signature) {
        warn!("Invalid signature, rejecting request");
        return Ok(WebhookOutcome::Unauthorized);
    }

    let _payload = parse_payload(body);

    let event = header_str(headers, EVENT_HEADER);
    if event != Some(PUSH_EVENT) {
        info!("Ignoring {} event", event.unwrap_or("<unspecified>"));
        return Ok(WebhookOutcome::Ignored);
    }

    info!(
        "Received push event, deploying {} (service {})...",
        state.config.repo_path, state.config.service_name
    );

    // Deploy on its own task so a fault in the pipeline surfaces as a
    // JoinError instead of tearing down the connection
    let deployer = state.deployer.clone();
    let report = tokio::spawn(async move { deployer.deploy().await })
        .await
        .map_err(|e| HookError::Internal(format!("Deployment task failed: {}", e)))?;

    if report.succeeded() {
        Ok(WebhookOutcome::Deployed)
    } else {
        Ok(WebhookOutcome::DeployFailed)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Decode the body as JSON. Empty or undecodable bodies become `{}`.
pub fn parse_payload(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::Object(Default::default());
    }
    match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(e) => {
            warn!("Payload is not valid JSON, treating as empty: {}", e);
            Value::Object(Default::default())
        }
    }
}
