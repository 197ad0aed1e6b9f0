//! HTTP boundary for the approval pipeline.
//!
//! Exposes the coordinator over a small JSON API:
//!
//! - `GET /` service info
//! - `GET /health`
//! - `POST /generate` `{ "topic": ... }`
//! - `POST /approve` `{ "workflow_id": ..., "approved": ... }`
//! - `GET /status/:workflow_id`
//! - `GET /pending`

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerSettings;
use crate::coordinator::{ApiError, ApproveRequest, GenerateRequest, RequestCoordinator};

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Create the router for the approval API
pub fn router(coordinator: RequestCoordinator) -> Router {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health))
        .route("/generate", post(generate))
        .route("/approve", post(approve))
        .route("/status/:workflow_id", get(status))
        .route("/pending", get(pending))
        .layer(TraceLayer::new_for_http())
        .with_state(coordinator)
}

/// Bind the configured address and serve until CTRL-C
pub async fn serve(settings: &ServerSettings, coordinator: RequestCoordinator) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", settings.host, settings.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Content approval API listening on {}", listener.local_addr()?);

    axum::serve(listener, router(coordinator))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

async fn service_info() -> impl IntoResponse {
    Json(json!({
        "message": "Content approval API",
        "status": "running",
        "endpoints": {
            "health": "GET /health",
            "generate": "POST /generate",
            "approve": "POST /approve",
            "status": "GET /status/{workflow_id}",
            "pending": "GET /pending",
        }
    }))
}

async fn health(State(coordinator): State<RequestCoordinator>) -> Response {
    match coordinator.health().await {
        Ok(health) => Json(health).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn generate(
    State(coordinator): State<RequestCoordinator>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    match coordinator.generate(request).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn approve(
    State(coordinator): State<RequestCoordinator>,
    Json(request): Json<ApproveRequest>,
) -> Response {
    match coordinator.approve(request).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn status(
    Path(workflow_id): Path<String>,
    State(coordinator): State<RequestCoordinator>,
) -> Response {
    match coordinator.status(&workflow_id).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn pending(State(coordinator): State<RequestCoordinator>) -> Response {
    match coordinator.pending().await {
        Ok(response) => Json(response).into_response(),
        Err(err) => err.into_response(),
    }
}
