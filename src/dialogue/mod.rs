pub mod engine;
pub mod messages;
pub mod validators;
