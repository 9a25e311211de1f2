//! Router configuration and server setup.

use std::future::Future;

use axum::{
    http::{HeaderValue, Uri},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::handlers::{self, auth, chat, home, knowledge, monitor, password, telegram};
use crate::state::AppState;

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}

async fn fallback(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("not found: {}", uri.path()))
}

/// Creates the API router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Health
        .route("/api/health", get(handlers::health))
        // Account
        .route("/", get(home::dashboard))
        .route("/profile", get(home::profile))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout).post(auth::logout))
        .route("/forgot-password", post(password::forgot_password))
        // Knowledge base
        .route("/knowledge-base", get(knowledge::list_entries))
        .route("/knowledge-base/add", post(knowledge::add_entry))
        .route("/knowledge-base/update/:id", post(knowledge::update_entry))
        .route("/knowledge-base/delete/:id", post(knowledge::delete_entry))
        .route("/knowledge-base/:id", get(knowledge::get_entry))
        // Telegram
        .route(
            "/telegram/connect",
            get(telegram::status).post(telegram::connect),
        )
        .route("/telegram/disconnect", post(telegram::disconnect))
        .route("/telegram/monitor", get(monitor::overview))
        .route("/telegram/monitor/start", post(monitor::start))
        .route("/telegram/monitor/stop", post(monitor::stop))
        .route("/telegram/monitor/user/:id", get(monitor::contact))
        .route("/telegram/monitor/ignore", post(monitor::ignore))
        .route("/telegram/monitor/unignore", post(monitor::unignore))
        // Auto-responder
        .route("/ollama-chat", get(chat::overview))
        .route("/ollama-chat/send", post(chat::send))
        .route("/ollama-chat/auto-respond/all/enable", post(chat::enable_all))
        .route("/ollama-chat/auto-respond/all/disable", post(chat::disable_all))
        .route("/ollama-chat/auto-respond/enable", post(chat::enable_user))
        .route("/ollama-chat/auto-respond/disable", post(chat::disable_user))
        .fallback(fallback)
        // Apply middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Starts the dashboard server and runs until `shutdown` resolves.
pub async fn serve<F>(state: AppState, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at {}", state.config.base_url());
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
