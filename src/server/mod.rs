// Reflectify — HTTP boundary
// Thin axum layer over the reflection engine. The only caller-visible error
// is a 400 for a blank message; everything else is a 200 carrying either a
// real reply or a fixed safe fallback.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::atoms::constants::FRONTEND_ORIGINS;
use crate::atoms::error::ReflectError;
use crate::atoms::types::ChatMessage;
use crate::engine::orchestrator::ReflectionEngine;

// ── DTOs ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReflectRequest {
    pub message: String,
    #[serde(default)]
    pub context: Vec<ChatMessage>,
    #[serde(default)]
    pub global_context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReflectResponse {
    pub response: String,
    pub debug_info: DebugInfo,
}

#[derive(Debug, Serialize)]
pub struct DebugInfo {
    pub context_messages_count: usize,
    pub global_context_length: usize,
    pub has_global_context: bool,
}

#[derive(Clone)]
struct AppState {
    engine: Arc<ReflectionEngine>,
}

// ── Router ─────────────────────────────────────────────────────────────────

pub fn router(engine: Arc<ReflectionEngine>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            FRONTEND_ORIGINS
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        )
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/reflect", post(reflect_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .with_state(AppState { engine })
}

// ── Handlers ───────────────────────────────────────────────────────────────

async fn reflect_handler(
    State(state): State<AppState>,
    Json(payload): Json<ReflectRequest>,
) -> Result<Json<ReflectResponse>, (StatusCode, String)> {
    let global_context = payload.global_context.as_deref().map(str::trim).unwrap_or("");
    info!(
        "[server] reflect: {} history messages, {} profile chars",
        payload.context.len(),
        global_context.len()
    );

    let profile = (!global_context.is_empty()).then_some(global_context);
    match state
        .engine
        .reflect(&payload.message, &payload.context, profile)
        .await
    {
        Ok(response) => Ok(Json(ReflectResponse {
            response,
            debug_info: DebugInfo {
                context_messages_count: payload.context.len(),
                global_context_length: global_context.len(),
                has_global_context: !global_context.is_empty(),
            },
        })),
        Err(ReflectError::BlankMessage) => {
            Err((StatusCode::BAD_REQUEST, "Message cannot be empty".to_string()))
        }
        Err(err) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error generating reflection: {err}"),
        )),
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({"status": "healthy"}))
}
