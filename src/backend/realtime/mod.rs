//! Real-time Notification Module
//!
//! The server half of the long-poll core: listeners on notification
//! channels, the `wait` race between a notification and a deadline, and
//! the publish side producers use after they commit.
//!
//! # Architecture
//!
//! - **`notifier`** - PostgreSQL and in-memory publish/subscribe backends
//! - **`listener`** - scoped listener leases and the listener budget
//! - **`subscription`** - `ChannelSubscriber::wait`
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and error type
//! ├── notifier.rs     - Notifier backends and publishing
//! ├── listener.rs     - ListenerLease and ListenerRegistry
//! └── subscription.rs - ChannelSubscriber and WaitOutcome
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use pollcast::backend::realtime::{ChannelSubscriber, ListenerRegistry, MemoryHub, Notifier};
//! use pollcast::shared::ChannelKey;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let subscriber = ChannelSubscriber::new(Notifier::Memory(MemoryHub::new()), ListenerRegistry::new(64));
//! let outcome = subscriber.wait(&ChannelKey::feed(), Duration::from_secs(60)).await?;
//! println!("notified: {}", outcome.notified());
//! # Ok(())
//! # }
//! ```

/// Notifier backends and publishing
pub mod notifier;

/// Listener leases and budget
pub mod listener;

/// Channel subscription (`wait`)
pub mod subscription;

pub use listener::{ListenerLease, ListenerRegistry};
pub use notifier::{notify_in_transaction, MemoryHub, Notifier, PublishError};
pub use subscription::{ChannelSubscriber, WaitOutcome};

use thiserror::Error;

/// Failure of a channel subscription
#[derive(Debug, Error)]
pub enum SubscriptionError {
    /// The listener could not be established
    #[error("failed to listen: {0}")]
    Listen(#[source] sqlx::Error),

    /// The listener failed while waiting
    #[error("listener failed: {0}")]
    Receive(#[source] sqlx::Error),

    /// The listener's connection or channel went away mid-wait
    #[error("listener closed")]
    Closed,

    /// Every listener slot is in use
    #[error("listener budget of {limit} exhausted")]
    Saturated { limit: usize },
}
