/**
 * Server Initialization
 *
 * Builds `AppState` from a `ServerConfig` and hands it to the router.
 *
 * # Backend selection
 *
 * - database reachable: `Notifier::Postgres` and `ThreadAccess::Postgres`
 *   on the same pool
 * - otherwise: `Notifier::Memory` and an empty in-memory membership table;
 *   producer routes answer 503
 *
 * In memory mode a background task drops hub channels nobody listens on.
 */

use std::time::Duration;

use axum::Router;
use sqlx::PgPool;
use tokio::task::JoinHandle;

use crate::backend::messaging::{MembershipTable, ThreadAccess};
use crate::backend::realtime::{ChannelSubscriber, ListenerRegistry, MemoryHub, Notifier};
use crate::backend::routes::router::create_router;
use crate::backend::server::config::{load_database, ServerConfig};
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
pub async fn create_app(config: &ServerConfig) -> Router<()> {
    tracing::info!("[Server] Initializing pollcast server");

    let db_pool = load_database(config).await;
    let app_state = build_state(config, db_pool);

    if let Notifier::Memory(hub) = app_state.subscriber.notifier() {
        spawn_cleanup_task(hub.clone(), config.cleanup_interval());
        tracing::info!("[Server] Periodic cleanup task started");
    }

    tracing::info!(
        "[Server] Router configured (backend: {}, max listeners: {})",
        app_state.subscriber.notifier().backend_name(),
        app_state.subscriber.registry().capacity()
    );

    create_router(app_state)
}

/// Assemble the application state for an optional database pool
pub fn build_state(config: &ServerConfig, db_pool: Option<PgPool>) -> AppState {
    let (notifier, thread_access) = match &db_pool {
        Some(pool) => (Notifier::Postgres(pool.clone()), ThreadAccess::Postgres(pool.clone())),
        None => (
            Notifier::Memory(MemoryHub::new()),
            ThreadAccess::Memory(MembershipTable::new()),
        ),
    };

    AppState {
        subscriber: ChannelSubscriber::new(notifier, ListenerRegistry::new(config.max_listeners)),
        thread_access,
        db_pool,
        session_keys: config.session_keys(),
        deadlines: config.deadlines(),
    }
}

/// Periodically drop memory-hub channels without waiters
pub fn spawn_cleanup_task(hub: MemoryHub, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            interval.tick().await;
            hub.cleanup_inactive_channels();
            tracing::debug!("[Server] Cleaned up inactive notification channels");
        }
    })
}
