/**
 * Channel Subscription
 *
 * `ChannelSubscriber::wait` is the server half of a long poll: open one
 * listener on a channel, race its first notification against a deadline,
 * and resolve exactly once.
 *
 * # Resolution
 *
 * - first matching notification -> `WaitOutcome::Notified`
 * - deadline elapsed, including while the listener was still being set
 *   up -> `WaitOutcome::TimedOut`
 * - listener failure -> `Err(SubscriptionError)`
 *
 * `tokio::select!` drops the losing branch, so a timeout cancels the
 * pending receive and a notification cancels the timer. Later
 * notifications on the same channel are never read by this call.
 *
 * # Release
 *
 * The listener lives in a `ListenerLease`. `wait` releases it before
 * returning on every outcome; if the `wait` future itself is dropped (the
 * HTTP client disconnected and axum dropped the handler) the lease's
 * `Drop` gives the connection and the budget slot back.
 */

use std::time::Duration;

use tokio::time::Instant;

use crate::backend::realtime::listener::{ListenerLease, ListenerRegistry};
use crate::backend::realtime::notifier::Notifier;
use crate::backend::realtime::SubscriptionError;
use crate::shared::{ChannelKey, Notification};

/// How a wait resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// A notification arrived before the deadline
    Notified(Notification),
    /// The deadline elapsed first
    TimedOut,
}

impl WaitOutcome {
    pub fn notified(&self) -> bool {
        matches!(self, Self::Notified(_))
    }
}

/// Opens dedicated listeners within a shared budget
#[derive(Clone)]
pub struct ChannelSubscriber {
    notifier: Notifier,
    registry: ListenerRegistry,
}

impl ChannelSubscriber {
    pub fn new(notifier: Notifier, registry: ListenerRegistry) -> Self {
        Self { notifier, registry }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    /// Open a listener on `channel`, failing fast when the budget is spent
    pub async fn open(&self, channel: &ChannelKey) -> Result<ListenerLease, SubscriptionError> {
        let permit = self.registry.reserve()?;
        self.notifier.open(channel, permit).await
    }

    /// Wait for the first notification on `channel` or for `deadline`
    ///
    /// The deadline counts from the moment `wait` is called, so time spent
    /// establishing the listener is part of it.
    pub async fn wait(&self, channel: &ChannelKey, deadline: Duration) -> Result<WaitOutcome, SubscriptionError> {
        let expires_at = Instant::now() + deadline;
        let mut lease = match tokio::time::timeout_at(expires_at, self.open(channel)).await {
            Ok(opened) => opened?,
            Err(_elapsed) => {
                tracing::warn!("[Realtime] Listener on {} not ready before the deadline", channel);
                return Ok(WaitOutcome::TimedOut);
            }
        };

        let outcome = tokio::select! {
            received = lease.next_notification() => received.map(WaitOutcome::Notified),
            _ = tokio::time::sleep_until(expires_at) => Ok(WaitOutcome::TimedOut),
        };

        lease.release();

        match &outcome {
            Ok(WaitOutcome::Notified(_)) => tracing::debug!("[Realtime] Wait on {} notified", channel),
            Ok(WaitOutcome::TimedOut) => tracing::debug!("[Realtime] Wait on {} timed out", channel),
            Err(e) => tracing::warn!("[Realtime] Wait on {} failed: {}", channel, e),
        }

        outcome
    }
}
