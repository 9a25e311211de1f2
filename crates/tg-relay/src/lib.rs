//! tg-relay - Telegram DM logger and auto-responder.
//!
//! The binary wires the stores, the Ollama client, the Telegram link and
//! the dashboard server together; see [`app::run`].

pub mod app;
pub mod cli;
