use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use cinevision::{require_script, AnalysisKind, ScriptReport};

use super::ScriptRequest;
use crate::error::ApiError;
use crate::state::AppState;

pub(super) async fn analyze(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    body: Result<Json<ScriptRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let kind = AnalysisKind::parse(&kind).ok_or(ApiError::UnknownAnalysis(kind))?;
    let Json(request) = body?;
    let script_text = require_script(request.script_text.as_deref())?;

    let value = state.service.analyze(kind, script_text).await?;
    Ok(Json(value))
}

pub(super) async fn upload(
    State(state): State<AppState>,
    body: Result<Json<ScriptRequest>, JsonRejection>,
) -> Result<Json<ScriptReport>, ApiError> {
    let Json(request) = body?;
    let script_text = require_script(request.script_text.as_deref())?;
    Ok(Json(state.service.upload(script_text)?))
}
