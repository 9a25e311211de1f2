//! HTTP dashboard API for tg-relay.
//!
//! JSON endpoints for the operator dashboard:
//! - Accounts (sign-up, login, logout, password reset)
//! - Knowledge base CRUD
//! - Telegram connection and direct-message monitor control
//! - Auto-responder toggles and manual replies
//!
//! Authentication is a session cookie (`relay_session`); protected routes
//! answer 401 without one.
//!
//! # Example
//!
//! ```ignore
//! use relay_api::{serve, ApiConfig, AppState};
//! use relay_core::{OllamaClient, RelayConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let relay = RelayConfig::from_env();
//!     let model = Arc::new(OllamaClient::new(&relay.ollama_url, &relay.ollama_model, relay.ollama_timeout));
//!     let state = AppState::new(ApiConfig::default(), relay, model);
//!
//!     serve(state, async { let _ = tokio::signal::ctrl_c().await; }).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod session;
pub mod state;
pub mod types;

pub use config::ApiConfig;
pub use error::{ApiError, Result};
pub use router::{create_router, serve};
pub use state::AppState;
