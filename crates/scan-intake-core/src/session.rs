use crate::record::Clock;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;

/// Who is scanning and under which session. Owned by the application layer
/// and handed to the engine explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub user: String,
    pub session_id: String,
    /// Epoch milliseconds.
    pub started_at: i64,
}

impl SessionContext {
    /// Start a new session with a freshly generated id.
    pub fn start(user: &str, clock: &dyn Clock) -> Self {
        let started_at = clock.now_millis();
        Self {
            user: user.to_string(),
            session_id: new_session_id(started_at),
            started_at,
        }
    }

    /// Resume a known session, e.g. after reloading persisted records.
    pub fn with_session_id(user: &str, session_id: &str, started_at: i64) -> Self {
        Self {
            user: user.to_string(),
            session_id: session_id.to_string(),
            started_at,
        }
    }
}

/// `SESS-<epoch ms>-<6 random lowercase alphanumerics>`.
pub fn new_session_id(now_millis: i64) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("SESS-{}-{}", now_millis, suffix)
}

/// Per-session tallies kept alongside the log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionCounters {
    pub accepted: u64,
    pub duplicates: u64,
    pub rejected: u64,
}

impl SessionCounters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
