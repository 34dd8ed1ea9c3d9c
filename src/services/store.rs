use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::queries;
use crate::dialogue::validators;
use crate::models::{Booking, EventWindow};

/// Booking lookup/update capability the dialogue engine runs against. The
/// engine only ever does a point lookup by code, a field-level reschedule
/// write, and a best-effort event-window resolution.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_by_code(&self, code: &str) -> anyhow::Result<Option<Booking>>;

    /// Write only the supplied fields plus the update timestamp. Last write
    /// wins; there is no optimistic-concurrency check on this path.
    async fn update_schedule(
        &self,
        booking_id: &str,
        new_date: Option<&str>,
        new_time: Option<&str>,
        updated_at: NaiveDateTime,
    ) -> anyhow::Result<()>;

    async fn find_event_window(&self, event_name: &str) -> anyhow::Result<Option<EventWindow>>;
}

/// Production store backed by the service's SQLite database.
pub struct SqliteBookingStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteBookingStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookingStore for SqliteBookingStore {
    async fn find_by_code(&self, code: &str) -> anyhow::Result<Option<Booking>> {
        let db = self.db.lock().unwrap();
        queries::get_booking_by_code(&db, code)
    }

    async fn update_schedule(
        &self,
        booking_id: &str,
        new_date: Option<&str>,
        new_time: Option<&str>,
        updated_at: NaiveDateTime,
    ) -> anyhow::Result<()> {
        let db = self.db.lock().unwrap();
        let updated =
            queries::update_booking_schedule(&db, booking_id, new_date, new_time, &updated_at)?;
        anyhow::ensure!(updated, "booking {booking_id} no longer exists");
        Ok(())
    }

    async fn find_event_window(&self, event_name: &str) -> anyhow::Result<Option<EventWindow>> {
        let events = {
            let db = self.db.lock().unwrap();
            queries::list_events(&db)?
        };
        Ok(validators::resolve_event_window(&events, event_name).cloned())
    }
}
