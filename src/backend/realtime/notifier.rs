/**
 * Notifier Backends
 *
 * The notify/listen primitive the long-poll core is built on. Two
 * implementations sit behind the `Notifier` enum:
 *
 * - `Postgres` - `NOTIFY`/`LISTEN` on the configured database. Each
 *   listener is a dedicated pooled connection.
 * - `Memory` - an in-process hub with one `tokio::sync::broadcast` sender
 *   per channel. Used when no database is configured and in tests.
 *
 * # Publish-after-commit
 *
 * PostgreSQL queues a `NOTIFY` issued inside a transaction and delivers it
 * only when the transaction commits, so producers call
 * [`notify_in_transaction`] next to their write. Producers on the memory
 * hub call [`Notifier::publish`] after their write has succeeded.
 */

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sqlx::postgres::PgListener;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::{broadcast, OwnedSemaphorePermit};

use crate::backend::realtime::listener::{ChannelListener, ListenerLease};
use crate::backend::realtime::SubscriptionError;
use crate::shared::{ChangeEvent, ChannelKey, Notification, SharedError};

/// Per-channel buffer of the in-memory hub. Waiters only ever need the
/// first notification, so a small buffer is plenty.
const MEMORY_CHANNEL_CAPACITY: usize = 16;

/// In-process publish/subscribe hub
///
/// Manages per-channel broadcast senders. Every waiter gets its own
/// receiver, so one publish wakes every waiter on that channel.
#[derive(Clone, Default)]
pub struct MemoryHub {
    channels: Arc<Mutex<HashMap<ChannelKey, broadcast::Sender<Notification>>>>,
}

impl MemoryHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the receiver side of a channel
    pub fn subscribe(&self, channel: &ChannelKey) -> broadcast::Receiver<Notification> {
        let mut channels = self.channels.lock();
        channels
            .entry(channel.clone())
            .or_insert_with(|| broadcast::channel(MEMORY_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish a payload; returns how many waiters were listening
    pub fn publish(&self, channel: &ChannelKey, payload: impl Into<String>) -> usize {
        let channels = self.channels.lock();
        match channels.get(channel) {
            Some(sender) => sender
                .send(Notification::new(channel.clone(), payload))
                .unwrap_or(0),
            None => 0,
        }
    }

    /// Drop senders nobody is listening on
    pub fn cleanup_inactive_channels(&self) {
        self.channels.lock().retain(|_, sender| sender.receiver_count() > 0);
    }

    /// Number of channels with a live sender
    pub fn channel_count(&self) -> usize {
        self.channels.lock().len()
    }

    /// Number of waiters on a channel (for diagnostics)
    pub fn get_subscriber_count(&self, channel: &ChannelKey) -> usize {
        self.channels
            .lock()
            .get(channel)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

/// Publish/subscribe backend used by subscriptions and producers
#[derive(Clone)]
pub enum Notifier {
    Postgres(PgPool),
    Memory(MemoryHub),
}

impl Notifier {
    /// Short backend name for logs and the health endpoint
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    /// Open one dedicated listener bound to `channel`
    ///
    /// If connecting or `LISTEN` fails, the permit is dropped together with
    /// the half-built listener and the slot is free again.
    pub(crate) async fn open(
        &self,
        channel: &ChannelKey,
        permit: OwnedSemaphorePermit,
    ) -> Result<ListenerLease, SubscriptionError> {
        match self {
            Self::Postgres(pool) => {
                let mut listener = PgListener::connect_with(pool)
                    .await
                    .map_err(SubscriptionError::Listen)?;
                listener
                    .listen(channel.as_str())
                    .await
                    .map_err(SubscriptionError::Listen)?;
                Ok(ListenerLease::new(channel.clone(), ChannelListener::Postgres(listener), permit))
            }
            Self::Memory(hub) => {
                let rx = hub.subscribe(channel);
                Ok(ListenerLease::new(channel.clone(), ChannelListener::Memory(rx), permit))
            }
        }
    }

    /// Publish a change event outside any transaction
    ///
    /// Only call this after the change it announces has been committed.
    pub async fn publish(&self, channel: &ChannelKey, event: &ChangeEvent) -> Result<(), PublishError> {
        let payload = event.to_payload()?;
        match self {
            Self::Postgres(pool) => {
                sqlx::query("SELECT pg_notify($1, $2)")
                    .bind(channel.as_str())
                    .bind(&payload)
                    .execute(pool)
                    .await?;
                tracing::debug!("[Realtime] NOTIFY {} ({} bytes)", channel, payload.len());
            }
            Self::Memory(hub) => {
                let waiters = hub.publish(channel, payload);
                tracing::debug!("[Realtime] Published on {} to {} waiters", channel, waiters);
            }
        }
        Ok(())
    }
}

/// Queue a notification inside the producer's transaction
///
/// PostgreSQL delivers it when `tx` commits and discards it on rollback.
pub async fn notify_in_transaction(
    tx: &mut Transaction<'_, Postgres>,
    channel: &ChannelKey,
    event: &ChangeEvent,
) -> Result<(), PublishError> {
    let payload = event.to_payload()?;
    sqlx::query("SELECT pg_notify($1, $2)")
        .bind(channel.as_str())
        .bind(&payload)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Failure to publish a change event
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("invalid event payload: {0}")]
    Payload(#[from] SharedError),
    #[error("notify failed: {0}")]
    Database(#[from] sqlx::Error),
}
