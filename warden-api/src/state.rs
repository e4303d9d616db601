//! Shared handler state.

use std::time::Instant;

use warden_session::WalletSession;

/// State shared by every handler.
pub struct AppState {
    /// The wallet session facade
    pub session: WalletSession,
    /// Server start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Wraps a session.
    pub fn new(session: WalletSession) -> Self {
        Self {
            session,
            started_at: Instant::now(),
        }
    }
}
