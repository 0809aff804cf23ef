//! Router assembly.

mod analyze;
mod storyboard;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::state::AppState;

/// Request body shared by every script-consuming route.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptRequest {
    #[serde(default)]
    pub script_text: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_body_bytes);

    Router::new()
        .route("/health", get(health))
        .route("/upload", post(analyze::upload))
        .route("/analyze/:kind", post(analyze::analyze))
        .route("/generate/storyboard", post(storyboard::generate))
        .route(
            "/generate/storyboard/progress/:id",
            get(storyboard::progress),
        )
        .layer(body_limit)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}
