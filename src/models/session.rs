use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Booking, EventWindow};

/// One named point in the fixed booking-modification flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DialogueStep {
    LanguageSelection,
    AskBookingId,
    ShowBookingInfo,
    AskVerification,
    VerifyDetails,
    EditOptions,
    EditDate,
    EditTime,
    AskContinueEditing,
    ConfirmChanges,
    AskMoreChanges,
    Completed,
}

impl DialogueStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogueStep::LanguageSelection => "language_selection",
            DialogueStep::AskBookingId => "ask_booking_id",
            DialogueStep::ShowBookingInfo => "show_booking_info",
            DialogueStep::AskVerification => "ask_verification",
            DialogueStep::VerifyDetails => "verify_details",
            DialogueStep::EditOptions => "edit_options",
            DialogueStep::EditDate => "edit_date",
            DialogueStep::EditTime => "edit_time",
            DialogueStep::AskContinueEditing => "ask_continue_editing",
            DialogueStep::ConfirmChanges => "confirm_changes",
            DialogueStep::AskMoreChanges => "ask_more_changes",
            DialogueStep::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Id,
}

/// Which fields the customer chose to modify at the edit menu.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EditTarget {
    Date,
    Time,
    Both,
}

/// Staging area for an in-flight modification; nothing is written to the
/// booking until the customer confirms.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingEdit {
    pub target: Option<EditTarget>,
    pub new_date: Option<String>,
    pub new_time: Option<String>,
}

impl PendingEdit {
    pub fn is_empty(&self) -> bool {
        self.new_date.is_none() && self.new_time.is_none()
    }
}

/// Per-conversation mutable state, persisted between messages keyed by the
/// sender identity (WhatsApp phone number or widget session id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueSession {
    pub session_key: String,
    pub step: DialogueStep,
    pub language: Option<Language>,
    /// The booking bound to this conversation once looked up.
    pub booking: Option<Booking>,
    /// Email submitted at `ask_verification`, pending the phone check.
    pub verification_email: Option<String>,
    /// Event window resolved for the bound booking, cached while editing.
    pub event_window: Option<EventWindow>,
    pub pending_edit: PendingEdit,
    pub last_activity: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl DialogueSession {
    pub fn new(session_key: &str) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            session_key: session_key.to_string(),
            step: DialogueStep::LanguageSelection,
            language: None,
            booking: None,
            verification_email: None,
            event_window: None,
            pending_edit: PendingEdit::default(),
            last_activity: now,
            expires_at: now + chrono::Duration::hours(24),
        }
    }
}
