/**
 * Channel Listeners
 *
 * A `ListenerLease` is the scoped handle on one dedicated listener: a
 * `LISTEN`ing PostgreSQL connection or a receiver on the in-memory hub.
 * The lease also holds one permit from the `ListenerRegistry`, so the
 * number of live leases is always the number of held listeners.
 *
 * Release is explicit on the normal path and implicit through `Drop`
 * everywhere else: an error propagated with `?`, a panic, or the request
 * future being dropped when the HTTP client goes away. Either way a
 * Postgres listener is dropped exactly once, and its own `Drop` issues the
 * one `UNLISTEN *` before the connection goes back to the pool.
 */

use std::sync::Arc;

use sqlx::postgres::PgListener;
use tokio::sync::{broadcast, OwnedSemaphorePermit, Semaphore};

use crate::backend::realtime::SubscriptionError;
use crate::shared::{ChannelKey, Notification};

/// Budget of simultaneously held listeners
///
/// Each dedicated listener pins a database connection, so the budget must
/// stay below the pool size (see `ServerConfig::pool_size`). Cloning shares
/// the budget.
#[derive(Clone, Debug)]
pub struct ListenerRegistry {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl ListenerRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Number of listeners currently held
    pub fn active(&self) -> usize {
        self.capacity - self.permits.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reserve a slot without waiting
    pub(crate) fn reserve(&self) -> Result<OwnedSemaphorePermit, SubscriptionError> {
        self.permits
            .clone()
            .try_acquire_owned()
            .map_err(|_| SubscriptionError::Saturated { limit: self.capacity })
    }
}

/// The underlying listener of a lease
pub(crate) enum ChannelListener {
    Postgres(PgListener),
    Memory(broadcast::Receiver<Notification>),
}

/// One held listener, bound to one channel
pub struct ListenerLease {
    channel: ChannelKey,
    listener: Option<ChannelListener>,
    _permit: OwnedSemaphorePermit,
}

impl ListenerLease {
    pub(crate) fn new(channel: ChannelKey, listener: ChannelListener, permit: OwnedSemaphorePermit) -> Self {
        tracing::debug!("[Realtime] Listener opened on {}", channel);
        Self {
            channel,
            listener: Some(listener),
            _permit: permit,
        }
    }

    pub fn channel(&self) -> &ChannelKey {
        &self.channel
    }

    /// Wait for the next notification on this lease's channel
    ///
    /// Notifications for other channels are skipped. A lagging in-memory
    /// receiver keeps reading; the next retained message still proves that
    /// something changed.
    pub async fn next_notification(&mut self) -> Result<Notification, SubscriptionError> {
        let channel = self.channel.clone();
        let listener = self.listener.as_mut().ok_or(SubscriptionError::Closed)?;

        match listener {
            ChannelListener::Postgres(pg) => loop {
                // try_recv reports a lost connection as None instead of
                // silently reconnecting and dropping what arrived meanwhile.
                let notification = pg
                    .try_recv()
                    .await
                    .map_err(SubscriptionError::Receive)?
                    .ok_or(SubscriptionError::Closed)?;

                if notification.channel() == channel.as_str() {
                    return Ok(Notification::new(channel.clone(), notification.payload()));
                }
            },
            ChannelListener::Memory(rx) => loop {
                match rx.recv().await {
                    Ok(notification) if notification.channel == channel => return Ok(notification),
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!("[Realtime] Listener on {} lagged by {} notifications", channel, skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => return Err(SubscriptionError::Closed),
                }
            },
        }
    }

    /// Tear the listener down and give its slot back
    pub fn release(mut self) {
        drop(self.listener.take());
    }
}

impl Drop for ListenerLease {
    fn drop(&mut self) {
        if self.listener.take().is_some() {
            tracing::debug!("[Realtime] Listener on {} dropped before release", self.channel);
        } else {
            tracing::debug!("[Realtime] Listener on {} released", self.channel);
        }
    }
}
