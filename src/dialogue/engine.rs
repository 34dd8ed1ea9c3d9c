use chrono::{NaiveDate, Utc};

use crate::dialogue::messages::render;
use crate::dialogue::validators::{self, CodeRule, DateError};
use crate::models::{DialogueSession, DialogueStep, EditTarget, Language, PendingEdit};
use crate::services::store::BookingStore;

/// Advance the dialogue one step: map (session, raw user text) to a reply,
/// mutating the session in place and touching the booking store where the
/// step calls for it. Store faults never escape; they are logged and turned
/// into a generic message, so a transport can always deliver something.
pub async fn advance(
    session: &mut DialogueSession,
    input: &str,
    store: &dyn BookingStore,
    code_rule: CodeRule,
) -> String {
    advance_at(session, input, store, code_rule, Utc::now().date_naive()).await
}

/// Same as [`advance`] with "today" injected, so date rules are testable.
pub async fn advance_at(
    session: &mut DialogueSession,
    input: &str,
    store: &dyn BookingStore,
    code_rule: CodeRule,
    today: NaiveDate,
) -> String {
    let input = input.trim();

    match session.step {
        DialogueStep::LanguageSelection => match input {
            "1" => {
                session.language = Some(Language::En);
                session.step = DialogueStep::AskBookingId;
                two_lines(msg(session, "greeting", &[]), msg(session, "ask_booking_id", &[]))
            }
            "2" => {
                session.language = Some(Language::Id);
                session.step = DialogueStep::AskBookingId;
                two_lines(msg(session, "greeting", &[]), msg(session, "ask_booking_id", &[]))
            }
            _ => msg(session, "choose_language", &[]),
        },

        DialogueStep::AskBookingId => {
            let Some(code) = validators::normalize_booking_code(input, code_rule) else {
                return msg(session, "invalid_code", &[]);
            };

            match store.find_by_code(&code).await {
                Ok(Some(booking)) => {
                    session.booking = Some(booking);
                    session.step = DialogueStep::ShowBookingInfo;
                    two_lines(booking_summary(session), msg(session, "booking_actions", &[]))
                }
                Ok(None) => msg(session, "booking_not_found", &[("code", &code)]),
                Err(e) => {
                    tracing::error!(code = %code, error = %e, "booking lookup failed");
                    msg(session, "lookup_failed", &[])
                }
            }
        }

        DialogueStep::ShowBookingInfo => match input {
            "1" => {
                session.step = DialogueStep::AskVerification;
                msg(session, "ask_email", &[])
            }
            "2" => {
                session.booking = None;
                session.verification_email = None;
                session.event_window = None;
                session.step = DialogueStep::AskBookingId;
                msg(session, "ask_booking_id", &[])
            }
            _ => msg(session, "booking_actions", &[]),
        },

        DialogueStep::AskVerification => {
            if input.contains('@') {
                session.verification_email = Some(input.to_string());
                session.step = DialogueStep::VerifyDetails;
                msg(session, "ask_phone", &[])
            } else {
                msg(session, "invalid_email", &[])
            }
        }

        DialogueStep::VerifyDetails => {
            let verified = match (&session.booking, &session.verification_email) {
                (Some(booking), Some(email)) => {
                    *email == booking.email && input == booking.phone
                }
                _ => false,
            };

            if verified {
                session.step = DialogueStep::EditOptions;
                msg(session, "edit_options", &[])
            } else {
                session.verification_email = None;
                session.step = DialogueStep::AskVerification;
                msg(session, "verification_failed", &[])
            }
        }

        DialogueStep::EditOptions => match input {
            "1" => {
                session.pending_edit = PendingEdit {
                    target: Some(EditTarget::Date),
                    ..PendingEdit::default()
                };
                session.step = DialogueStep::EditDate;
                date_prompt(session, store).await
            }
            "2" => {
                session.pending_edit = PendingEdit {
                    target: Some(EditTarget::Time),
                    ..PendingEdit::default()
                };
                session.step = DialogueStep::EditTime;
                msg(session, "ask_new_time", &[])
            }
            "3" => {
                session.pending_edit = PendingEdit {
                    target: Some(EditTarget::Both),
                    ..PendingEdit::default()
                };
                session.step = DialogueStep::EditDate;
                date_prompt(session, store).await
            }
            "4" => {
                session.step = DialogueStep::Completed;
                msg(session, "cancelled", &[])
            }
            _ => msg(session, "edit_options", &[]),
        },

        DialogueStep::EditDate => {
            match validators::validate_new_date(input, today, session.event_window.as_ref()) {
                Err(DateError::BadFormat) => msg(session, "invalid_date", &[]),
                Err(DateError::InPast) => msg(session, "date_in_past", &[]),
                Err(DateError::OutsideWindow(w)) => msg(
                    session,
                    "date_outside_window",
                    &[
                        ("event", w.display_name()),
                        ("start", &validators::display_date(w.start_date)),
                        ("end", &validators::display_date(w.end_date)),
                    ],
                ),
                Err(DateError::TooFarAhead) => msg(session, "date_too_far", &[]),
                Ok((date, caveat)) => {
                    session.pending_edit.new_date = Some(validators::storage_date(date));
                    let mut reply = msg(
                        session,
                        "date_recorded",
                        &[("date", &validators::display_date(date))],
                    );
                    if caveat {
                        reply.push('\n');
                        reply.push_str(&msg(session, "date_caveat", &[]));
                    }
                    reply.push_str("\n\n");
                    if session.pending_edit.target == Some(EditTarget::Both)
                        && session.pending_edit.new_time.is_none()
                    {
                        session.step = DialogueStep::EditTime;
                        reply.push_str(&msg(session, "ask_new_time", &[]));
                    } else {
                        session.step = DialogueStep::AskContinueEditing;
                        reply.push_str(&msg(session, "continue_editing", &[]));
                    }
                    reply
                }
            }
        }

        DialogueStep::EditTime => match validators::validate_time(input) {
            None => msg(session, "invalid_time", &[]),
            Some(time) => {
                session.pending_edit.new_time = Some(time.clone());
                let mut reply = msg(session, "time_recorded", &[("time", &time)]);
                reply.push_str("\n\n");
                if session.pending_edit.target == Some(EditTarget::Both)
                    && session.pending_edit.new_date.is_none()
                {
                    session.step = DialogueStep::EditDate;
                    reply.push_str(&date_prompt(session, store).await);
                } else {
                    session.step = DialogueStep::AskContinueEditing;
                    reply.push_str(&msg(session, "continue_editing", &[]));
                }
                reply
            }
        },

        DialogueStep::AskContinueEditing => match input {
            "1" => {
                if session.pending_edit.new_date.is_none() {
                    session.step = DialogueStep::EditDate;
                    date_prompt(session, store).await
                } else if session.pending_edit.new_time.is_none() {
                    session.step = DialogueStep::EditTime;
                    msg(session, "ask_new_time", &[])
                } else {
                    msg(session, "continue_editing", &[])
                }
            }
            "2" => {
                if session.pending_edit.is_empty() {
                    session.step = DialogueStep::Completed;
                    msg(session, "changes_discarded", &[])
                } else {
                    session.step = DialogueStep::ConfirmChanges;
                    let changes = changes_summary(session);
                    msg(session, "confirm_changes", &[("changes", &changes)])
                }
            }
            "3" => {
                session.pending_edit = PendingEdit::default();
                session.step = DialogueStep::Completed;
                msg(session, "changes_discarded", &[])
            }
            _ => msg(session, "continue_editing", &[]),
        },

        DialogueStep::ConfirmChanges => match input {
            "1" => {
                let Some(booking_id) = session.booking.as_ref().map(|b| b.id.clone()) else {
                    session.step = DialogueStep::Completed;
                    return msg(session, "update_failed", &[]);
                };

                let now = Utc::now().naive_utc();
                let result = store
                    .update_schedule(
                        &booking_id,
                        session.pending_edit.new_date.as_deref(),
                        session.pending_edit.new_time.as_deref(),
                        now,
                    )
                    .await;

                match result {
                    Ok(()) => {
                        if let Some(booking) = session.booking.as_mut() {
                            if let Some(date) = &session.pending_edit.new_date {
                                booking.booking_date = date.clone();
                            }
                            if let Some(time) = &session.pending_edit.new_time {
                                booking.booking_time = time.clone();
                            }
                            booking.updated_at = now;
                        }
                        session.pending_edit = PendingEdit::default();
                        session.step = DialogueStep::AskMoreChanges;
                        two_lines(
                            msg(session, "changes_saved", &[]),
                            msg(session, "ask_more_changes", &[]),
                        )
                    }
                    Err(e) => {
                        tracing::error!(booking_id = %booking_id, error = %e, "booking update failed");
                        session.step = DialogueStep::Completed;
                        msg(session, "update_failed", &[])
                    }
                }
            }
            "2" => {
                session.pending_edit = PendingEdit::default();
                session.step = DialogueStep::Completed;
                msg(session, "changes_discarded", &[])
            }
            _ => {
                let changes = changes_summary(session);
                msg(session, "confirm_changes", &[("changes", &changes)])
            }
        },

        DialogueStep::AskMoreChanges => match input {
            "1" => {
                session.pending_edit = PendingEdit::default();
                session.step = DialogueStep::EditOptions;
                msg(session, "edit_options", &[])
            }
            "2" => {
                session.step = DialogueStep::Completed;
                msg(session, "goodbye", &[])
            }
            _ => msg(session, "ask_more_changes", &[]),
        },

        // Terminal: nothing beyond the closing remark, no side effects.
        DialogueStep::Completed => msg(session, "goodbye", &[]),
    }
}

fn msg(session: &DialogueSession, key: &str, args: &[(&str, &str)]) -> String {
    render(session.language.unwrap_or(Language::En), key, args)
}

fn two_lines(a: String, b: String) -> String {
    format!("{a}\n\n{b}")
}

/// Stored dates are `YYYY-MM-DD`; customers see `DD-MM-YYYY`.
fn display_stored_date(stored: &str) -> String {
    validators::parse_flexible_date(stored)
        .map(validators::display_date)
        .unwrap_or_else(|| stored.to_string())
}

fn booking_summary(session: &DialogueSession) -> String {
    let Some(b) = &session.booking else {
        return String::new();
    };
    msg(
        session,
        "booking_summary",
        &[
            ("code", &b.code),
            ("name", &b.customer_name),
            ("event", &b.event_name),
            ("date", &display_stored_date(&b.booking_date)),
            ("time", &b.booking_time),
            ("adults", &b.adults.to_string()),
            ("children", &b.children.to_string()),
            ("status", b.status.as_str()),
            ("payment", b.payment_status.as_str()),
        ],
    )
}

fn changes_summary(session: &DialogueSession) -> String {
    let mut lines = Vec::new();
    if let Some(date) = &session.pending_edit.new_date {
        lines.push(msg(session, "new_date_line", &[("date", &display_stored_date(date))]));
    }
    if let Some(time) = &session.pending_edit.new_time {
        lines.push(msg(session, "new_time_line", &[("time", time)]));
    }
    lines.join("\n")
}

/// Resolve the bound booking's event window to enrich the date prompt with
/// the allowed range. Resolution failure degrades to the plain prompt.
async fn date_prompt(session: &mut DialogueSession, store: &dyn BookingStore) -> String {
    let event_name = session
        .booking
        .as_ref()
        .map(|b| b.event_name.clone())
        .unwrap_or_default();

    session.event_window = match store.find_event_window(&event_name).await {
        Ok(window) => window,
        Err(e) => {
            tracing::warn!(event = %event_name, error = %e, "event window lookup failed");
            None
        }
    };

    match &session.event_window {
        Some(w) => {
            let start = validators::display_date(w.start_date);
            let end = validators::display_date(w.end_date);
            msg(
                session,
                "ask_new_date_range",
                &[("event", w.display_name()), ("start", &start), ("end", &end)],
            )
        }
        None => msg(session, "ask_new_date", &[]),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{Duration, NaiveDateTime};

    use super::*;
    use crate::models::{Booking, BookingStatus, EventWindow, PaymentStatus};

    struct MockStore {
        booking: Mutex<Option<Booking>>,
        events: Vec<EventWindow>,
        fail_lookups: bool,
        fail_writes: bool,
    }

    impl MockStore {
        fn with_booking(booking: Booking) -> Self {
            Self {
                booking: Mutex::new(Some(booking)),
                events: vec![],
                fail_lookups: false,
                fail_writes: false,
            }
        }

        fn empty() -> Self {
            Self {
                booking: Mutex::new(None),
                events: vec![],
                fail_lookups: false,
                fail_writes: false,
            }
        }
    }

    #[async_trait]
    impl BookingStore for MockStore {
        async fn find_by_code(&self, code: &str) -> anyhow::Result<Option<Booking>> {
            if self.fail_lookups {
                anyhow::bail!("store unavailable");
            }
            let booking = self.booking.lock().unwrap();
            Ok(booking.as_ref().filter(|b| b.code == code).cloned())
        }

        async fn update_schedule(
            &self,
            _booking_id: &str,
            new_date: Option<&str>,
            new_time: Option<&str>,
            updated_at: NaiveDateTime,
        ) -> anyhow::Result<()> {
            if self.fail_writes {
                anyhow::bail!("write failed");
            }
            let mut booking = self.booking.lock().unwrap();
            let booking = booking.as_mut().expect("no booking to update");
            if let Some(date) = new_date {
                booking.booking_date = date.to_string();
            }
            if let Some(time) = new_time {
                booking.booking_time = time.to_string();
            }
            booking.updated_at = updated_at;
            Ok(())
        }

        async fn find_event_window(&self, event_name: &str) -> anyhow::Result<Option<EventWindow>> {
            if self.fail_lookups {
                anyhow::bail!("store unavailable");
            }
            Ok(validators::resolve_event_window(&self.events, event_name).cloned())
        }
    }

    fn sample_booking() -> Booking {
        let now = Utc::now().naive_utc();
        Booking {
            id: "internal-1".to_string(),
            code: "BUP001".to_string(),
            customer_name: "Budi Santoso".to_string(),
            email: "a@x.com".to_string(),
            phone: "08123".to_string(),
            event_name: "Gala Dinner".to_string(),
            booking_date: "2030-05-10".to_string(),
            booking_time: "19:00".to_string(),
            adults: 2,
            children: 1,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Paid,
            created_at: now,
            updated_at: now,
        }
    }

    async fn step(session: &mut DialogueSession, store: &MockStore, input: &str) -> String {
        advance(session, input, store, CodeRule::Strict).await
    }

    /// Drive a fresh session through language, lookup, and verification.
    async fn verified_session(store: &MockStore) -> DialogueSession {
        let mut session = DialogueSession::new("628123");
        step(&mut session, store, "1").await;
        step(&mut session, store, "BUP001").await;
        step(&mut session, store, "1").await;
        step(&mut session, store, "a@x.com").await;
        let reply = step(&mut session, store, "08123").await;
        assert_eq!(session.step, DialogueStep::EditOptions, "reply: {reply}");
        session
    }

    #[tokio::test]
    async fn time_only_edit_commits_and_leaves_date_unchanged() {
        let store = MockStore::with_booking(sample_booking());
        let mut session = verified_session(&store).await;

        step(&mut session, &store, "2").await;
        assert_eq!(session.step, DialogueStep::EditTime);
        step(&mut session, &store, "14:30").await;
        assert_eq!(session.step, DialogueStep::AskContinueEditing);
        step(&mut session, &store, "2").await;
        assert_eq!(session.step, DialogueStep::ConfirmChanges);
        let reply = step(&mut session, &store, "1").await;

        assert_eq!(session.step, DialogueStep::AskMoreChanges, "reply: {reply}");
        let booking = store.booking.lock().unwrap().clone().unwrap();
        assert_eq!(booking.booking_time, "14:30");
        assert_eq!(booking.booking_date, "2030-05-10");
        // Session's bound booking reflects the merge too
        assert_eq!(session.booking.as_ref().unwrap().booking_time, "14:30");
    }

    #[tokio::test]
    async fn wrong_phone_returns_to_verification_without_write() {
        let store = MockStore::with_booking(sample_booking());
        let mut session = DialogueSession::new("628123");
        step(&mut session, &store, "1").await;
        step(&mut session, &store, "BUP001").await;
        step(&mut session, &store, "1").await;
        step(&mut session, &store, "a@x.com").await;
        step(&mut session, &store, "00000").await;

        assert_eq!(session.step, DialogueStep::AskVerification);
        assert!(session.booking.is_some(), "booking stays bound");
        assert!(session.verification_email.is_none(), "verification cleared");
        let booking = store.booking.lock().unwrap().clone().unwrap();
        assert_eq!(booking.booking_time, "19:00");
    }

    #[tokio::test]
    async fn verification_is_case_sensitive_exact_equality() {
        let store = MockStore::with_booking(sample_booking());
        let mut session = DialogueSession::new("628123");
        step(&mut session, &store, "1").await;
        step(&mut session, &store, "BUP001").await;
        step(&mut session, &store, "1").await;
        step(&mut session, &store, "A@X.com").await;
        step(&mut session, &store, "08123").await;

        assert_eq!(session.step, DialogueStep::AskVerification);
    }

    #[tokio::test]
    async fn unknown_code_stays_in_ask_booking_id() {
        let store = MockStore::empty();
        let mut session = DialogueSession::new("628123");
        step(&mut session, &store, "1").await;
        let reply = step(&mut session, &store, "ZZZ999").await;

        assert_eq!(session.step, DialogueStep::AskBookingId);
        assert!(reply.contains("ZZZ999"), "names the code: {reply}");
        assert!(session.booking.is_none());
    }

    #[tokio::test]
    async fn malformed_code_reprompts() {
        let store = MockStore::empty();
        let mut session = DialogueSession::new("628123");
        step(&mut session, &store, "1").await;
        let reply = step(&mut session, &store, "not a code").await;

        assert_eq!(session.step, DialogueStep::AskBookingId);
        assert!(reply.contains("6"), "format error: {reply}");
    }

    #[tokio::test]
    async fn language_menu_reprompts_until_valid_then_sticks() {
        let store = MockStore::with_booking(sample_booking());
        let mut session = DialogueSession::new("628123");

        let reply = step(&mut session, &store, "hello").await;
        assert_eq!(session.step, DialogueStep::LanguageSelection);
        assert!(reply.contains("1. English"));

        let reply = step(&mut session, &store, "2").await;
        assert_eq!(session.language, Some(Language::Id));
        assert!(reply.contains("kode booking"), "Indonesian prompt: {reply}");
    }

    #[tokio::test]
    async fn date_edit_respects_event_window() {
        let today = Utc::now().date_naive();
        let mut store = MockStore::with_booking(sample_booking());
        store.events = vec![EventWindow {
            id: "ev-1".to_string(),
            name: "Gala Dinner".to_string(),
            title: None,
            alt_name: None,
            start_date: today + Duration::days(10),
            end_date: today + Duration::days(20),
        }];

        let mut session = verified_session(&store).await;
        let prompt = step(&mut session, &store, "1").await;
        assert_eq!(session.step, DialogueStep::EditDate);
        assert!(prompt.contains("Gala Dinner"), "range in prompt: {prompt}");

        // Outside the window
        let outside = (today + Duration::days(25)).format("%Y-%m-%d").to_string();
        let reply = step(&mut session, &store, &outside).await;
        assert_eq!(session.step, DialogueStep::EditDate);
        assert!(reply.contains("Gala Dinner"), "rejection names event: {reply}");

        // Inclusive lower bound
        let boundary = (today + Duration::days(10)).format("%Y-%m-%d").to_string();
        step(&mut session, &store, &boundary).await;
        assert_eq!(session.step, DialogueStep::AskContinueEditing);
        assert_eq!(session.pending_edit.new_date.as_deref(), Some(boundary.as_str()));
    }

    #[tokio::test]
    async fn past_date_rejected_even_without_window() {
        let store = MockStore::with_booking(sample_booking());
        let mut session = verified_session(&store).await;
        step(&mut session, &store, "1").await;

        let yesterday = (Utc::now().date_naive() - Duration::days(1))
            .format("%d-%m-%Y")
            .to_string();
        step(&mut session, &store, &yesterday).await;
        assert_eq!(session.step, DialogueStep::EditDate);
        assert!(session.pending_edit.new_date.is_none());
    }

    #[tokio::test]
    async fn both_edit_chains_date_then_time() {
        let store = MockStore::with_booking(sample_booking());
        let mut session = verified_session(&store).await;

        step(&mut session, &store, "3").await;
        assert_eq!(session.step, DialogueStep::EditDate);

        let date = (Utc::now().date_naive() + Duration::days(30))
            .format("%Y-%m-%d")
            .to_string();
        step(&mut session, &store, &date).await;
        assert_eq!(session.step, DialogueStep::EditTime);

        step(&mut session, &store, "09:15").await;
        assert_eq!(session.step, DialogueStep::AskContinueEditing);
        assert_eq!(session.pending_edit.new_date.as_deref(), Some(date.as_str()));
        assert_eq!(session.pending_edit.new_time.as_deref(), Some("09:15"));
    }

    #[tokio::test]
    async fn write_failure_degrades_to_completed() {
        let mut store = MockStore::with_booking(sample_booking());
        store.fail_writes = true;
        let mut session = verified_session(&store).await;

        step(&mut session, &store, "2").await;
        step(&mut session, &store, "14:30").await;
        step(&mut session, &store, "2").await;
        let reply = step(&mut session, &store, "1").await;

        assert_eq!(session.step, DialogueStep::Completed);
        assert!(reply.contains("try again"), "generic error: {reply}");
    }

    #[tokio::test]
    async fn lookup_failure_stays_for_retry() {
        let mut store = MockStore::empty();
        store.fail_lookups = true;
        let mut session = DialogueSession::new("628123");
        step(&mut session, &store, "1").await;
        let reply = step(&mut session, &store, "BUP001").await;

        assert_eq!(session.step, DialogueStep::AskBookingId);
        assert!(reply.contains("try again"), "generic error: {reply}");
    }

    #[tokio::test]
    async fn discard_at_confirm_ends_without_write() {
        let store = MockStore::with_booking(sample_booking());
        let mut session = verified_session(&store).await;

        step(&mut session, &store, "2").await;
        step(&mut session, &store, "14:30").await;
        step(&mut session, &store, "2").await;
        step(&mut session, &store, "2").await;

        assert_eq!(session.step, DialogueStep::Completed);
        let booking = store.booking.lock().unwrap().clone().unwrap();
        assert_eq!(booking.booking_time, "19:00");
    }

    #[tokio::test]
    async fn completed_is_terminal() {
        let store = MockStore::with_booking(sample_booking());
        let mut session = verified_session(&store).await;
        step(&mut session, &store, "4").await;
        assert_eq!(session.step, DialogueStep::Completed);

        let reply = step(&mut session, &store, "1").await;
        assert_eq!(session.step, DialogueStep::Completed);
        assert!(reply.contains("Thank you"), "closing remark: {reply}");
    }

    #[tokio::test]
    async fn more_changes_loops_back_to_edit_menu() {
        let store = MockStore::with_booking(sample_booking());
        let mut session = verified_session(&store).await;

        step(&mut session, &store, "2").await;
        step(&mut session, &store, "14:30").await;
        step(&mut session, &store, "2").await;
        step(&mut session, &store, "1").await;
        assert_eq!(session.step, DialogueStep::AskMoreChanges);

        step(&mut session, &store, "1").await;
        assert_eq!(session.step, DialogueStep::EditOptions);
        assert!(session.pending_edit.is_empty());
    }
}
