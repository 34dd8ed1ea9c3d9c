use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::db::queries;
use crate::dialogue::engine;
use crate::dialogue::validators::CodeRule;
use crate::models::DialogueSession;
use crate::services::store::SqliteBookingStore;
use crate::state::AppState;

/// Run one inbound message through the dialogue engine: load (or create) the
/// sender's session, advance it, refresh the 24h idle TTL, and persist it.
/// Both transports (WhatsApp webhook and the chat widget) call this.
pub async fn process_message(
    state: &Arc<AppState>,
    session_key: &str,
    message: &str,
) -> anyhow::Result<String> {
    let mut session = {
        let db = state.db.lock().unwrap();
        queries::get_session(&db, session_key)?
    }
    .unwrap_or_else(|| DialogueSession::new(session_key));

    tracing::info!(
        session_key,
        step = session.step.as_str(),
        "processing message"
    );

    let code_rule = if state.config.lenient_booking_codes {
        CodeRule::Lenient
    } else {
        CodeRule::Strict
    };

    let store = SqliteBookingStore::new(Arc::clone(&state.db));
    let reply = engine::advance(&mut session, message, &store, code_rule).await;

    let now = Utc::now().naive_utc();
    session.last_activity = now;
    session.expires_at = now + Duration::hours(24);

    {
        let db = state.db.lock().unwrap();
        queries::save_session(&db, &session)?;
        // Opportunistic cleanup; failure here shouldn't fail the message.
        if let Err(e) = queries::purge_expired_sessions(&db) {
            tracing::warn!(error = %e, "failed to purge expired sessions");
        }
    }

    Ok(reply)
}
