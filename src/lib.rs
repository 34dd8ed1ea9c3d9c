pub mod config;
pub mod db;
pub mod dialogue;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
