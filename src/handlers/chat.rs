use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::services::conversation;
use crate::state::AppState;

pub async fn chat_page() -> Html<&'static str> {
    Html(include_str!("../web/chat.html"))
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub reply: String,
}

/// Widget transport: same dialogue engine as the WhatsApp webhook, but the
/// reply travels back in the HTTP response. A fresh session id is minted when
/// the widget doesn't supply one.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let session_id = payload
        .session_id
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| format!("web-{}", uuid::Uuid::new_v4()));

    let reply = conversation::process_message(&state, &session_id, payload.message.trim()).await?;

    Ok(Json(ChatResponse { session_id, reply }))
}

#[derive(Deserialize)]
pub struct ResetRequest {
    pub session_id: String,
}

/// Called when the widget closes; mirrors the in-page conversation being
/// discarded on unmount.
pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = {
        let db = state.db.lock().unwrap();
        queries::delete_session(&db, &payload.session_id)?
    };

    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
