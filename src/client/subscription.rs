//! Subscription handle
//!
//! A declarative wrapper around [`PollClient`] for UI-style consumers that
//! re-render with a fresh set of options: call [`PollSubscription::configure`]
//! every time and the handle reconciles the running client with them.

use std::sync::Arc;

use crate::client::error::PollError;
use crate::client::poll_client::{ErrorCallback, EventCallback, PollClient};
use crate::client::retry::BackoffStrategy;
use crate::client::transport::PollTransport;
use crate::shared::{ChannelKey, PollEnvelope};

/// Desired subscription state
#[derive(Clone)]
pub struct SubscriptionOptions {
    pub channel: ChannelKey,
    pub enabled: bool,
    pub on_event: EventCallback,
    pub on_error: ErrorCallback,
}

impl SubscriptionOptions {
    pub fn new(channel: ChannelKey, on_event: impl Fn(PollEnvelope) + Send + Sync + 'static) -> Self {
        Self {
            channel,
            enabled: true,
            on_event: Arc::new(on_event),
            on_error: Arc::new(|_| {}),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn on_error(mut self, on_error: impl Fn(&PollError) + Send + Sync + 'static) -> Self {
        self.on_error = Arc::new(on_error);
        self
    }
}

/// Snapshot returned from `configure`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionStatus {
    pub is_active: bool,
    pub last_error: Option<String>,
}

/// Long-lived handle owning at most one poll client
pub struct PollSubscription<T: PollTransport> {
    transport: Arc<T>,
    backoff: BackoffStrategy,
    client: Option<PollClient<T>>,
}

impl<T: PollTransport> PollSubscription<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            backoff: BackoffStrategy::default(),
            client: None,
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// Apply `options` and report the resulting status
    ///
    /// A changed channel stops the old cycle before the new callbacks are
    /// installed, so the new consumer only sees events from the new channel;
    /// `enabled: false` leaves the client `Idle` with nothing in flight.
    pub async fn configure(&mut self, options: SubscriptionOptions) -> SubscriptionStatus {
        let SubscriptionOptions {
            channel,
            enabled,
            on_event,
            on_error,
        } = options;

        match self.client.as_mut() {
            Some(client) if client.channel() == &channel => {
                client.set_callbacks(on_event, on_error);
            }
            Some(client) => {
                // old cycle gone before the new callbacks go in
                client.stop().await;
                client.set_callbacks(on_event, on_error);
                client.set_channel(channel).await;
            }
            None => {
                let client = PollClient::new(self.transport.clone(), channel).with_backoff(self.backoff.clone());
                client.set_callbacks(on_event, on_error);
                self.client = Some(client);
            }
        }

        if let Some(client) = &self.client {
            if enabled {
                client.start();
            } else {
                client.stop().await;
            }
        }

        self.status()
    }

    /// Stop and start again, clearing the last error
    pub async fn restart(&self) {
        if let Some(client) = &self.client {
            client.stop().await;
            client.start();
        }
    }

    /// Stop polling; the handle can be reconfigured afterwards
    pub async fn shutdown(&self) {
        if let Some(client) = &self.client {
            client.stop().await;
        }
    }

    pub fn status(&self) -> SubscriptionStatus {
        match &self.client {
            Some(client) => SubscriptionStatus {
                is_active: client.is_active(),
                last_error: client.last_error(),
            },
            None => SubscriptionStatus {
                is_active: false,
                last_error: None,
            },
        }
    }

    pub fn channel(&self) -> Option<&ChannelKey> {
        self.client.as_ref().map(|client| client.channel())
    }
}
