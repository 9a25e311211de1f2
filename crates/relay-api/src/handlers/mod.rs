//! API request handlers.

pub mod auth;
pub mod chat;
pub mod health;
pub mod home;
pub mod knowledge;
pub mod monitor;
pub mod password;
pub mod telegram;

pub use health::health;
