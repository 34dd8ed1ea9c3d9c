use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use guestdesk::config::AppConfig;
use guestdesk::db;
use guestdesk::handlers;
use guestdesk::services::messaging::whatsapp::WhatsAppSender;
use guestdesk::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    if config.whatsapp_access_token.is_empty() {
        tracing::warn!("WHATSAPP_ACCESS_TOKEN not set, outbound messages will be dropped");
    }
    let sender = WhatsAppSender::new(
        config.graph_api_base.clone(),
        config.whatsapp_access_token.clone(),
        config.whatsapp_phone_number_id.clone(),
    );

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        sender: Box::new(sender),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/webhook/whatsapp",
            get(handlers::webhook::verify_webhook).post(handlers::webhook::receive_webhook),
        )
        .route("/chat", get(handlers::chat::chat_page))
        .route("/api/chat", post(handlers::chat::send_message))
        .route("/api/chat/reset", post(handlers::chat::reset_session))
        .route("/api/admin/bookings", get(handlers::admin::get_bookings))
        .route("/api/admin/events", get(handlers::admin::get_events))
        .route("/api/admin/sessions", get(handlers::admin::get_sessions))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
