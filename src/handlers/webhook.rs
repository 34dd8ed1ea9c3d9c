use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::services::conversation;
use crate::state::AppState;

// ── Subscription verification (GET) ──

#[derive(Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

pub async fn verify_webhook(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VerifyParams>,
) -> Response {
    let token_matches = params.verify_token.as_deref() == Some(&state.config.whatsapp_verify_token)
        && !state.config.whatsapp_verify_token.is_empty();

    if params.mode.as_deref() == Some("subscribe") && token_matches {
        let challenge = params.challenge.unwrap_or_default();
        tracing::info!("webhook subscription verified");
        return (StatusCode::OK, challenge).into_response();
    }

    tracing::warn!("webhook verification failed");
    (StatusCode::FORBIDDEN, "Forbidden").into_response()
}

// ── Event dispatch (POST) ──

#[derive(Deserialize)]
pub struct WebhookEnvelope {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Deserialize)]
pub struct WebhookChange {
    pub value: ChangeValue,
}

#[derive(Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
}

#[derive(Deserialize)]
pub struct IncomingMessage {
    pub from: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub text: Option<TextBody>,
}

#[derive(Deserialize)]
pub struct TextBody {
    pub body: String,
}

fn validate_signature(app_secret: &str, signature: &str, body: &str) -> bool {
    let Some(received) = signature.strip_prefix("sha256=") else {
        return false;
    };

    let mut mac = match Hmac::<Sha256>::new_from_slice(app_secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(body.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    expected == received
}

pub async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    // Validate payload signature (skip if app secret is empty, dev mode)
    if !state.config.whatsapp_app_secret.is_empty() {
        let signature = headers
            .get("x-hub-signature-256")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !validate_signature(&state.config.whatsapp_app_secret, signature, &body) {
            tracing::warn!("invalid webhook signature");
            return (StatusCode::FORBIDDEN, "Invalid signature").into_response();
        }
    }

    let envelope: WebhookEnvelope = match serde_json::from_str(&body) {
        Ok(env) => env,
        Err(e) => {
            tracing::warn!(error = %e, "unparseable webhook payload");
            return (StatusCode::NOT_FOUND, "Not Found").into_response();
        }
    };

    if envelope.object != "whatsapp_business_account" {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }

    for entry in &envelope.entry {
        for change in &entry.changes {
            for message in &change.value.messages {
                let Some(text) = message.text.as_ref() else {
                    tracing::debug!(kind = ?message.kind, "ignoring non-text message");
                    continue;
                };

                let from = message.from.trim();
                tracing::info!(from, "incoming WhatsApp message");

                match conversation::process_message(&state, from, text.body.trim()).await {
                    Ok(reply) => {
                        if let Err(e) = state.sender.send_text(from, &reply).await {
                            tracing::error!(error = %e, from, "failed to send reply");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, from, "conversation processing failed");
                        let fallback =
                            "Sorry, something went wrong. Please try again in a moment.";
                        let _ = state.sender.send_text(from, fallback).await;
                    }
                }
            }
        }
    }

    (StatusCode::OK, "EVENT_RECEIVED").into_response()
}
