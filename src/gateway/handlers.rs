//! Route handlers.

use axum::{
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use teloxide::types::Update;

use super::server::AppState;
use crate::astronomy::{VisibilityReport, VisibilityRequest};
use crate::telegram::incoming_text;
use crate::workflow::WorkflowInput;

pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

type ApiError = (StatusCode, Json<Value>);

fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "ok": false, "error": message.into() })))
}

/// POST /webhook/telegram: run the workflow for a Telegram update.
pub async fn telegram_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    if let Some(expected) = &state.webhook_secret {
        let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if provided != Some(expected.expose()) {
            tracing::warn!("Rejected webhook call with missing or wrong secret token");
            return Err(error_response(StatusCode::UNAUTHORIZED, "invalid secret token"));
        }
    }

    let update: Update = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!("Malformed Telegram update: {}", e);
        error_response(StatusCode::BAD_REQUEST, format!("invalid update: {e}"))
    })?;

    let Some(incoming) = incoming_text(&update) else {
        tracing::debug!(update_id = update.id.0, "Ignoring update without text message");
        return Ok(Json(json!({ "ok": true })));
    };

    let input = WorkflowInput {
        chat_id: incoming.chat_id,
        text: incoming.text,
    };
    match state.workflow.run(input).await {
        Ok(_) => Ok(Json(json!({ "ok": true }))),
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false, "step": e.step(), "error": e.to_string() })),
        )),
    }
}

/// POST /api/visibility: compute a visibility report directly.
pub async fn visibility(
    State(state): State<AppState>,
    payload: Result<Json<VisibilityRequest>, JsonRejection>,
) -> Result<Json<VisibilityReport>, ApiError> {
    let Json(request) =
        payload.map_err(|e| error_response(StatusCode::BAD_REQUEST, e.body_text()))?;
    let (observer, at) = request
        .resolve(Utc::now())
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))?;

    let calculator = Arc::clone(&state.calculator);
    let report = tokio::task::spawn_blocking(move || calculator.compute(&observer, at))
        .await
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(report))
}

/// GET /health: liveness check.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "stargazer",
        "version": crate::VERSION,
    }))
}
