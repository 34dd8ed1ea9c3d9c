pub mod booking;
pub mod event;
pub mod session;

pub use booking::{Booking, BookingStatus, PaymentStatus};
pub use event::EventWindow;
pub use session::{DialogueSession, DialogueStep, EditTarget, Language, PendingEdit};
