use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A reservation as stored in the bookings table. `code` is the short
/// human-readable identifier customers quote in chat; `id` is internal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub code: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub event_name: String,
    /// Calendar date, stored as `YYYY-MM-DD`.
    pub booking_date: String,
    /// 24-hour `HH:MM`.
    pub booking_time: String,
    pub adults: i32,
    pub children: i32,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "partial" => PaymentStatus::Partial,
            "paid" => PaymentStatus::Paid,
            _ => PaymentStatus::Unpaid,
        }
    }
}
