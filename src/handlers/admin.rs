use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Language;
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct BookingResponse {
    id: String,
    code: String,
    customer_name: String,
    email: String,
    phone: String,
    event_name: String,
    booking_date: String,
    booking_time: String,
    adults: i32,
    children: i32,
    status: String,
    payment_status: String,
    updated_at: String,
}

pub async fn get_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let limit = query.limit.unwrap_or(50);
    let status_filter = query.status.as_deref();

    let bookings = {
        let db = state.db.lock().unwrap();
        queries::get_all_bookings(&db, status_filter, limit)?
    };

    let response: Vec<BookingResponse> = bookings
        .into_iter()
        .map(|b| BookingResponse {
            id: b.id,
            code: b.code,
            customer_name: b.customer_name,
            email: b.email,
            phone: b.phone,
            event_name: b.event_name,
            booking_date: b.booking_date,
            booking_time: b.booking_time,
            adults: b.adults,
            children: b.children,
            status: b.status.as_str().to_string(),
            payment_status: b.payment_status.as_str().to_string(),
            updated_at: b.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .collect();

    Ok(Json(response))
}

// GET /api/admin/events
#[derive(Serialize)]
pub struct EventResponse {
    id: String,
    name: String,
    title: Option<String>,
    alt_name: Option<String>,
    start_date: String,
    end_date: String,
}

pub async fn get_events(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let events = {
        let db = state.db.lock().unwrap();
        queries::list_events(&db)?
    };

    let response: Vec<EventResponse> = events
        .into_iter()
        .map(|e| EventResponse {
            id: e.id,
            name: e.name,
            title: e.title,
            alt_name: e.alt_name,
            start_date: e.start_date.format("%Y-%m-%d").to_string(),
            end_date: e.end_date.format("%Y-%m-%d").to_string(),
        })
        .collect();

    Ok(Json(response))
}

// GET /api/admin/sessions
#[derive(Serialize)]
pub struct SessionResponse {
    session_key: String,
    step: String,
    language: Option<String>,
    booking_code: Option<String>,
    last_activity: String,
    expires_at: String,
}

pub async fn get_sessions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<SessionResponse>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let sessions = {
        let db = state.db.lock().unwrap();
        queries::list_sessions(&db)?
    };

    let response: Vec<SessionResponse> = sessions
        .into_iter()
        .map(|s| SessionResponse {
            session_key: s.session_key,
            step: s.step.as_str().to_string(),
            language: s.language.map(|l| {
                match l {
                    Language::En => "en",
                    Language::Id => "id",
                }
                .to_string()
            }),
            booking_code: s.booking.map(|b| b.code),
            last_activity: s.last_activity.format("%Y-%m-%d %H:%M:%S").to_string(),
            expires_at: s.expires_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .collect();

    Ok(Json(response))
}
