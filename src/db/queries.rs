use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Booking, BookingStatus, DialogueSession, EventWindow, PaymentStatus};

const TS_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TS_FMT).unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Sessions ──

pub fn get_session(conn: &Connection, session_key: &str) -> anyhow::Result<Option<DialogueSession>> {
    let now = Utc::now().naive_utc().format(TS_FMT).to_string();
    let mut stmt = conn.prepare(
        "SELECT data, last_activity, expires_at FROM sessions
         WHERE session_key = ?1 AND expires_at > ?2",
    )?;

    let result = stmt.query_row(params![session_key, now], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    });

    match result {
        Ok((data, last_activity, expires_at)) => {
            let mut session: DialogueSession = match serde_json::from_str(&data) {
                Ok(s) => s,
                Err(e) => {
                    // Unreadable payload: treat as no session rather than failing
                    // the whole message.
                    tracing::warn!(session_key, error = %e, "discarding corrupt session payload");
                    return Ok(None);
                }
            };
            session.last_activity = parse_ts(&last_activity);
            session.expires_at = parse_ts(&expires_at);
            Ok(Some(session))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_session(conn: &Connection, session: &DialogueSession) -> anyhow::Result<()> {
    let data = serde_json::to_string(session)?;
    let last_activity = session.last_activity.format(TS_FMT).to_string();
    let expires_at = session.expires_at.format(TS_FMT).to_string();

    conn.execute(
        "INSERT INTO sessions (session_key, data, last_activity, expires_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(session_key) DO UPDATE SET
           data = excluded.data,
           last_activity = excluded.last_activity,
           expires_at = excluded.expires_at",
        params![session.session_key, data, last_activity, expires_at],
    )?;
    Ok(())
}

pub fn delete_session(conn: &Connection, session_key: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM sessions WHERE session_key = ?1",
        params![session_key],
    )?;
    Ok(count > 0)
}

pub fn purge_expired_sessions(conn: &Connection) -> anyhow::Result<usize> {
    let now = Utc::now().naive_utc().format(TS_FMT).to_string();
    let count = conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now])?;
    Ok(count)
}

pub fn list_sessions(conn: &Connection) -> anyhow::Result<Vec<DialogueSession>> {
    let now = Utc::now().naive_utc().format(TS_FMT).to_string();
    let mut stmt = conn.prepare(
        "SELECT data, last_activity, expires_at FROM sessions
         WHERE expires_at > ?1 ORDER BY last_activity DESC",
    )?;

    let rows = stmt.query_map(params![now], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut sessions = Vec::new();
    for row in rows {
        let (data, last_activity, expires_at) = row?;
        if let Ok(mut session) = serde_json::from_str::<DialogueSession>(&data) {
            session.last_activity = parse_ts(&last_activity);
            session.expires_at = parse_ts(&expires_at);
            sessions.push(session);
        }
    }
    Ok(sessions)
}

// ── Bookings ──

fn booking_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Booking> {
    Ok(Booking {
        id: row.get(0)?,
        code: row.get(1)?,
        customer_name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        event_name: row.get(5)?,
        booking_date: row.get(6)?,
        booking_time: row.get(7)?,
        adults: row.get(8)?,
        children: row.get(9)?,
        status: BookingStatus::parse(&row.get::<_, String>(10)?),
        payment_status: PaymentStatus::parse(&row.get::<_, String>(11)?),
        created_at: parse_ts(&row.get::<_, String>(12)?),
        updated_at: parse_ts(&row.get::<_, String>(13)?),
    })
}

const BOOKING_COLS: &str = "id, code, customer_name, email, phone, event_name, booking_date, \
     booking_time, adults, children, status, payment_status, created_at, updated_at";

/// Provisioning insert. Bookings are created by the upstream reservation
/// system, not through the dialogue; this backs seeding scripts and tests.
pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, code, customer_name, email, phone, event_name, booking_date,
             booking_time, adults, children, status, payment_status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            booking.id,
            booking.code,
            booking.customer_name,
            booking.email,
            booking.phone,
            booking.event_name,
            booking.booking_date,
            booking.booking_time,
            booking.adults,
            booking.children,
            booking.status.as_str(),
            booking.payment_status.as_str(),
            booking.created_at.format(TS_FMT).to_string(),
            booking.updated_at.format(TS_FMT).to_string(),
        ],
    )?;
    Ok(())
}

/// Point lookup by the human-readable booking code, case-insensitive.
pub fn get_booking_by_code(conn: &Connection, code: &str) -> anyhow::Result<Option<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLS} FROM bookings WHERE code = ?1 COLLATE NOCASE"
    ))?;

    match stmt.query_row(params![code], booking_from_row) {
        Ok(booking) => Ok(Some(booking)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Field-level reschedule write. Only the date, the time, and the update
/// timestamp are writable through the dialogue flow.
pub fn update_booking_schedule(
    conn: &Connection,
    id: &str,
    new_date: Option<&str>,
    new_time: Option<&str>,
    updated_at: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let ts = updated_at.format(TS_FMT).to_string();
    let count = match (new_date, new_time) {
        (Some(date), Some(time)) => conn.execute(
            "UPDATE bookings SET booking_date = ?1, booking_time = ?2, updated_at = ?3 WHERE id = ?4",
            params![date, time, ts, id],
        )?,
        (Some(date), None) => conn.execute(
            "UPDATE bookings SET booking_date = ?1, updated_at = ?2 WHERE id = ?3",
            params![date, ts, id],
        )?,
        (None, Some(time)) => conn.execute(
            "UPDATE bookings SET booking_time = ?1, updated_at = ?2 WHERE id = ?3",
            params![time, ts, id],
        )?,
        (None, None) => 0,
    };
    Ok(count > 0)
}

pub fn get_all_bookings(
    conn: &Connection,
    status: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<Booking>> {
    let mut bookings = Vec::new();

    if let Some(status) = status {
        let mut stmt = conn.prepare(&format!(
            "SELECT {BOOKING_COLS} FROM bookings WHERE status = ?1
             ORDER BY booking_date, booking_time LIMIT ?2"
        ))?;
        let rows = stmt.query_map(params![status, limit], booking_from_row)?;
        for row in rows {
            bookings.push(row?);
        }
    } else {
        let mut stmt = conn.prepare(&format!(
            "SELECT {BOOKING_COLS} FROM bookings ORDER BY booking_date, booking_time LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit], booking_from_row)?;
        for row in rows {
            bookings.push(row?);
        }
    }

    Ok(bookings)
}

// ── Events ──

/// Provisioning insert, same role as [`create_booking`].
pub fn create_event(conn: &Connection, event: &EventWindow) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO events (id, name, title, alt_name, start_date, end_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            event.id,
            event.name,
            event.title,
            event.alt_name,
            event.start_date.format("%Y-%m-%d").to_string(),
            event.end_date.format("%Y-%m-%d").to_string(),
        ],
    )?;
    Ok(())
}

pub fn list_events(conn: &Connection) -> anyhow::Result<Vec<EventWindow>> {
    let mut stmt =
        conn.prepare("SELECT id, name, title, alt_name, start_date, end_date FROM events")?;

    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
        ))
    })?;

    let mut events = Vec::new();
    for row in rows {
        let (id, name, title, alt_name, start, end) = row?;
        let (Ok(start_date), Ok(end_date)) = (
            NaiveDate::parse_from_str(&start, "%Y-%m-%d"),
            NaiveDate::parse_from_str(&end, "%Y-%m-%d"),
        ) else {
            tracing::warn!(event = %name, "skipping event with unparseable window dates");
            continue;
        };
        events.push(EventWindow {
            id,
            name,
            title,
            alt_name,
            start_date,
            end_date,
        });
    }
    Ok(events)
}
