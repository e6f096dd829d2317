/**
 * Application State Management
 *
 * `AppState` is the central state container handed to the router. The
 * `FromRef` implementations let handlers extract just the part they need
 * (`State<ChannelSubscriber>`, `State<Option<PgPool>>`, ...).
 *
 * # Thread Safety
 *
 * Every field is cheap to clone and shares its interior:
 * - `ChannelSubscriber` holds the notifier and the listener budget (`Arc`)
 * - `ThreadAccess` holds a pool or an `Arc`'d membership table
 * - `PgPool` is reference counted
 */

use std::time::Duration;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::backend::auth::SessionKeys;
use crate::backend::messaging::ThreadAccess;
use crate::backend::realtime::ChannelSubscriber;
use crate::shared::protocol::DEFAULT_POLL_DEADLINE;

/// Deadline of each poll endpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollDeadlines {
    pub feed: Duration,
    pub thread: Duration,
}

impl Default for PollDeadlines {
    fn default() -> Self {
        Self {
            feed: DEFAULT_POLL_DEADLINE,
            thread: DEFAULT_POLL_DEADLINE,
        }
    }
}

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Opens listeners for poll requests
    pub subscriber: ChannelSubscriber,

    /// Participant check for thread channels
    pub thread_access: ThreadAccess,

    /// Optional PostgreSQL pool; producers answer 503 without it
    pub db_pool: Option<PgPool>,

    /// JWT verification keys
    pub session_keys: SessionKeys,

    /// Poll deadline per endpoint
    pub deadlines: PollDeadlines,
}

impl FromRef<AppState> for ChannelSubscriber {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.subscriber.clone()
    }
}

impl FromRef<AppState> for ThreadAccess {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.thread_access.clone()
    }
}

impl FromRef<AppState> for Option<PgPool> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.db_pool.clone()
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.session_keys.clone()
    }
}

impl FromRef<AppState> for PollDeadlines {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.deadlines
    }
}
