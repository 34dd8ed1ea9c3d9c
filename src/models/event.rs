use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The calendar window during which a named event accepts bookings.
/// Events carry up to three name-ish fields because bookings reference
/// them by display name only, with no stable foreign key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventWindow {
    pub id: String,
    pub name: String,
    pub title: Option<String>,
    pub alt_name: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl EventWindow {
    /// The name to show customers when quoting the window.
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}
