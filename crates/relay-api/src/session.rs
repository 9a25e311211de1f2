//! Login sessions and password-reset tickets.
//!
//! Both live in memory only; a restart logs everyone out.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "relay_session";

/// Lifetime of a password-reset ticket.
pub const RESET_TICKET_TTL: Duration = Duration::from_secs(10 * 60);

/// Default login lifetime.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 3600);

/// Longest lifetime a grant can have.
const MAX_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 3600);

#[derive(Debug, Clone)]
struct Grant {
    username: String,
    expires_at: Instant,
}

impl Grant {
    fn new(username: &str, ttl: Duration) -> Self {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl.min(MAX_TTL)).unwrap_or(now);
        Self {
            username: username.to_string(),
            expires_at,
        }
    }

    fn is_live(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Random opaque token.
fn new_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Logged-in sessions keyed by cookie token.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Grant>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Starts a session for `username` and returns its token.
    pub async fn create(&self, username: &str) -> String {
        let token = new_token();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, g| g.is_live());
        sessions.insert(token.clone(), Grant::new(username, self.ttl));
        debug!(username = %username, "Session created");
        token
    }

    /// Username behind a live session.
    pub async fn username(&self, token: &str) -> Option<String> {
        let grant = self.sessions.read().await.get(token).cloned()?;
        if grant.is_live() {
            return Some(grant.username);
        }
        self.sessions.write().await.remove(token);
        None
    }

    /// Ends a session. Unknown tokens are ignored.
    pub async fn destroy(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

/// Single-use tickets proving the date-of-birth step was passed.
pub struct ResetTickets {
    tickets: RwLock<HashMap<String, Grant>>,
    ttl: Duration,
}

impl ResetTickets {
    pub fn new(ttl: Duration) -> Self {
        Self {
            tickets: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Issues a ticket for `username`.
    pub async fn issue(&self, username: &str) -> String {
        let token = new_token();
        let mut tickets = self.tickets.write().await;
        tickets.retain(|_, g| g.is_live());
        tickets.insert(token.clone(), Grant::new(username, self.ttl));
        token
    }

    /// Redeems a ticket for `username`.
    ///
    /// A matching ticket is removed; expired or foreign tickets are rejected.
    pub async fn redeem(&self, token: &str, username: &str) -> bool {
        let mut tickets = self.tickets.write().await;
        match tickets.get(token) {
            Some(g) if g.username == username && g.is_live() => {
                tickets.remove(token);
                true
            }
            Some(g) if !g.is_live() => {
                tickets.remove(token);
                false
            }
            _ => false,
        }
    }
}

impl Default for ResetTickets {
    fn default() -> Self {
        Self::new(RESET_TICKET_TTL)
    }
}

/// Extracts the session token from the `Cookie` header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty())
}

/// `Set-Cookie` value establishing a session.
pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl.as_secs()
    )
}

/// `Set-Cookie` value removing the session cookie.
pub fn clear_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}
