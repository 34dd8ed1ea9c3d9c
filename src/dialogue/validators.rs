use chrono::{Months, NaiveDate};

use crate::models::EventWindow;

/// Which booking-code shape a deployment accepts. The strict form is the
/// 6-character code printed on confirmations; the lenient form additionally
/// allows hyphen-delimited codes issued by older channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeRule {
    Strict,
    Lenient,
}

/// Validate and normalize a booking code to uppercase. Returns `None` when
/// the input doesn't match the configured shape.
pub fn normalize_booking_code(input: &str, rule: CodeRule) -> Option<String> {
    let input = input.trim();

    let strict_ok = input.len() == 6 && input.chars().all(|c| c.is_ascii_alphanumeric());
    if strict_ok {
        return Some(input.to_ascii_uppercase());
    }

    if rule == CodeRule::Lenient {
        let segments: Vec<&str> = input.split('-').collect();
        let lenient_ok = (2..=6).contains(&segments.len())
            && segments
                .iter()
                .all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()));
        if lenient_ok {
            return Some(input.to_ascii_uppercase());
        }
    }

    None
}

/// Parse a date in either `DD-MM-YYYY` or `YYYY-MM-DD`. Component widths are
/// fixed, so an accepted date always displays back exactly as entered.
pub fn parse_flexible_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    let parts: Vec<&str> = input.split('-').collect();
    let [a, b, c] = parts.as_slice() else {
        return None;
    };
    match (a.len(), b.len(), c.len()) {
        (4, 2, 2) => NaiveDate::parse_from_str(input, "%Y-%m-%d").ok(),
        (2, 2, 4) => NaiveDate::parse_from_str(input, "%d-%m-%Y").ok(),
        _ => None,
    }
}

/// Storage format for calendar dates.
pub fn storage_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Display format used in customer-facing messages.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

#[derive(Debug, Clone)]
pub enum DateError {
    BadFormat,
    InPast,
    /// Outside the resolved event window; carries the window for messaging.
    OutsideWindow(EventWindow),
    TooFarAhead,
}

/// Validate a proposed new booking date. Checks run in order: format, not
/// before today (date-only), event-window bounds when a window was resolved,
/// otherwise a soft two-year cap. The returned flag is true when the date was
/// accepted without an event window to check against, so the caller should
/// attach a caveat.
pub fn validate_new_date(
    input: &str,
    today: NaiveDate,
    window: Option<&EventWindow>,
) -> Result<(NaiveDate, bool), DateError> {
    let date = parse_flexible_date(input).ok_or(DateError::BadFormat)?;

    if date < today {
        return Err(DateError::InPast);
    }

    match window {
        Some(w) => {
            if date < w.start_date || date > w.end_date {
                return Err(DateError::OutsideWindow(w.clone()));
            }
            Ok((date, false))
        }
        None => {
            let cap = today + Months::new(24);
            if date > cap {
                return Err(DateError::TooFarAhead);
            }
            Ok((date, true))
        }
    }
}

/// Strict 24-hour `HH:MM`, both components two digits.
pub fn validate_time(input: &str) -> Option<String> {
    let input = input.trim();
    let (hh, mm) = input.split_once(':')?;
    if hh.len() != 2 || mm.len() != 2 {
        return None;
    }
    if !hh.chars().all(|c| c.is_ascii_digit()) || !mm.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: u32 = hh.parse().ok()?;
    let minutes: u32 = mm.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(format!("{hours:02}:{minutes:02}"))
}

/// Best-effort event lookup by display name. Bookings carry no stable event
/// reference, so matching is heuristic: exact (case-insensitive) on title,
/// name, then alternate name; then substring containment either way once the
/// query is longer than two characters. First hit wins in iteration order.
pub fn resolve_event_window<'a>(events: &'a [EventWindow], query: &str) -> Option<&'a EventWindow> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    let q = query.to_lowercase();
    let exact = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase() == q);

    if let Some(hit) = events.iter().find(|e| exact(e.title.as_deref())) {
        return Some(hit);
    }
    if let Some(hit) = events.iter().find(|e| e.name.to_lowercase() == q) {
        return Some(hit);
    }
    if let Some(hit) = events.iter().find(|e| exact(e.alt_name.as_deref())) {
        return Some(hit);
    }

    if query.len() > 2 {
        return events.iter().find(|e| {
            [e.title.as_deref(), Some(e.name.as_str()), e.alt_name.as_deref()]
                .into_iter()
                .flatten()
                .map(str::to_lowercase)
                .any(|f| f.contains(&q) || q.contains(&f))
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn window(start: &str, end: &str) -> EventWindow {
        EventWindow {
            id: "ev-1".to_string(),
            name: "Gala Dinner".to_string(),
            title: None,
            alt_name: None,
            start_date: date(start),
            end_date: date(end),
        }
    }

    #[test]
    fn strict_code_accepts_six_alphanumerics() {
        assert_eq!(
            normalize_booking_code("bup001", CodeRule::Strict),
            Some("BUP001".to_string())
        );
        assert_eq!(
            normalize_booking_code("  BUP001  ", CodeRule::Strict),
            Some("BUP001".to_string())
        );
    }

    #[test]
    fn strict_code_rejects_wrong_length_and_symbols() {
        assert_eq!(normalize_booking_code("BUP01", CodeRule::Strict), None);
        assert_eq!(normalize_booking_code("BUP0011", CodeRule::Strict), None);
        assert_eq!(normalize_booking_code("BUP-01", CodeRule::Strict), None);
        assert_eq!(normalize_booking_code("", CodeRule::Strict), None);
    }

    #[test]
    fn lenient_code_accepts_hyphenated_segments() {
        assert_eq!(
            normalize_booking_code("bup-2025-001", CodeRule::Lenient),
            Some("BUP-2025-001".to_string())
        );
        assert_eq!(
            normalize_booking_code("BUP001", CodeRule::Lenient),
            Some("BUP001".to_string())
        );
    }

    #[test]
    fn lenient_code_rejects_empty_segments_and_too_many() {
        assert_eq!(normalize_booking_code("a--b", CodeRule::Lenient), None);
        assert_eq!(normalize_booking_code("a-b-c-d-e-f-g", CodeRule::Lenient), None);
        assert_eq!(normalize_booking_code("justoneword", CodeRule::Lenient), None);
    }

    #[test]
    fn date_parses_both_formats() {
        assert_eq!(parse_flexible_date("2025-01-15"), Some(date("2025-01-15")));
        assert_eq!(parse_flexible_date("15-01-2025"), Some(date("2025-01-15")));
        assert_eq!(parse_flexible_date("15/01/2025"), None);
        assert_eq!(parse_flexible_date("tomorrow"), None);
    }

    #[test]
    fn unpadded_date_components_rejected() {
        assert_eq!(parse_flexible_date("5-1-2025"), None);
        assert_eq!(parse_flexible_date("2025-1-5"), None);
        assert_eq!(parse_flexible_date("15-1-2025"), None);
        assert_eq!(parse_flexible_date("05-01-2025"), Some(date("2025-01-05")));
    }

    #[test]
    fn dmy_round_trip_is_identity() {
        let input = "15-01-2025";
        let parsed = parse_flexible_date(input).unwrap();
        let stored = storage_date(parsed);
        assert_eq!(stored, "2025-01-15");
        let back = parse_flexible_date(&stored).unwrap();
        assert_eq!(display_date(back), input);
    }

    #[test]
    fn past_dates_rejected_regardless_of_window() {
        let today = date("2025-01-15");
        let w = window("2025-01-01", "2025-01-31");
        assert!(matches!(
            validate_new_date("2025-01-14", today, Some(&w)),
            Err(DateError::InPast)
        ));
        assert!(matches!(
            validate_new_date("2025-01-14", today, None),
            Err(DateError::InPast)
        ));
        // Today itself is fine
        assert!(validate_new_date("2025-01-15", today, Some(&w)).is_ok());
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let today = date("2025-01-01");
        let w = window("2025-01-10", "2025-01-20");
        assert!(validate_new_date("2025-01-10", today, Some(&w)).is_ok());
        assert!(validate_new_date("2025-01-20", today, Some(&w)).is_ok());
        assert!(matches!(
            validate_new_date("2025-01-09", today, Some(&w)),
            Err(DateError::OutsideWindow(_))
        ));
        assert!(matches!(
            validate_new_date("2025-01-21", today, Some(&w)),
            Err(DateError::OutsideWindow(_))
        ));
    }

    #[test]
    fn no_window_applies_two_year_cap_with_caveat() {
        let today = date("2025-01-15");
        let (d, caveat) = validate_new_date("2026-06-01", today, None).unwrap();
        assert_eq!(d, date("2026-06-01"));
        assert!(caveat);
        assert!(matches!(
            validate_new_date("2027-02-01", today, None),
            Err(DateError::TooFarAhead)
        ));
    }

    #[test]
    fn time_validation_bounds() {
        assert_eq!(validate_time("14:30"), Some("14:30".to_string()));
        assert_eq!(validate_time("00:00"), Some("00:00".to_string()));
        assert_eq!(validate_time("23:59"), Some("23:59".to_string()));
        assert_eq!(validate_time("9:05"), None);
        assert_eq!(validate_time("24:00"), None);
        assert_eq!(validate_time("12:60"), None);
        assert_eq!(validate_time("12:5"), None);
        assert_eq!(validate_time("noon"), None);
        assert_eq!(validate_time("12:30:00"), None);
    }

    #[test]
    fn event_resolution_prefers_exact_title_then_name() {
        let events = vec![
            EventWindow {
                id: "1".to_string(),
                name: "gala".to_string(),
                title: Some("New Year Gala".to_string()),
                alt_name: None,
                start_date: date("2025-01-01"),
                end_date: date("2025-01-05"),
            },
            EventWindow {
                id: "2".to_string(),
                name: "New Year Gala".to_string(),
                title: None,
                alt_name: None,
                start_date: date("2025-02-01"),
                end_date: date("2025-02-05"),
            },
        ];

        let hit = resolve_event_window(&events, "new year gala").unwrap();
        assert_eq!(hit.id, "1");
    }

    #[test]
    fn event_resolution_falls_back_to_substring() {
        let events = vec![window("2025-01-10", "2025-01-20")];
        assert!(resolve_event_window(&events, "gala").is_some());
        assert!(resolve_event_window(&events, "Grand Gala Dinner Night").is_some());
        // Two characters or fewer never substring-match
        assert!(resolve_event_window(&events, "ga").is_none());
        assert!(resolve_event_window(&events, "quiz night").is_none());
    }
}
