//! HTTP chat server: single-page UI, chat endpoint and template download.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use templabot_ai::Predict;
use templabot_core::{DOWNLOAD_FILE_NAME, DOWNLOAD_MIME, GREETING, PromptGate};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::chat::{ChatReply, respond};

const INDEX_HTML: &str = include_str!("../assets/index.html");
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Shared state for all handlers.
pub struct AppState {
    pub predictor: Arc<dyn Predict>,
    pub gate: PromptGate,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Debug, Deserialize)]
struct DownloadRequest {
    template: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

// ── Handlers ──

/// GET / - chat page
async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(
        INDEX_HTML
            .replace("__PLACEHOLDER__", &state.gate.placeholder())
            .replace("__GREETING__", GREETING),
    )
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// POST /api/chat - answer one prompt
async fn chat(State(state): State<Arc<AppState>>, Json(body): Json<ChatRequest>) -> Response {
    // Inference is CPU-bound; keep it off the async workers.
    let reply = tokio::task::spawn_blocking(move || {
        respond(&state.gate, state.predictor.as_ref(), &body.message)
    })
    .await;

    match reply {
        Ok(reply) => Json::<ChatReply>(reply).into_response(),
        Err(e) => {
            error!(error = %e, "chat task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "prediction task failed")
        }
    }
}

/// POST /api/download - return the template verbatim as an attachment
async fn download(Json(body): Json<DownloadRequest>) -> Response {
    if body.template.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "template is required");
    }
    (
        [
            (header::CONTENT_TYPE, DOWNLOAD_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILE_NAME}\""),
            ),
        ],
        body.template,
    )
        .into_response()
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/chat", post(chat))
        .route("/api/download", post(download))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "chat server listening");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
