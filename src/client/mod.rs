//! Poll Client
//!
//! Native client side of the long-poll protocol:
//!
//! - [`transport`] - one request per call, `reqwest` behind a trait
//! - [`poll_client`] - the `Idle`/`Polling` state machine that keeps
//!   reissuing requests and retries after failures
//! - [`subscription`] - a declarative handle reconciling a client with the
//!   options it is configured with
//! - [`retry`] - fixed and exponential backoff

pub mod config;
pub mod error;
pub mod poll_client;
pub mod retry;
pub mod subscription;
pub mod transport;

pub use config::Config;
pub use error::PollError;
pub use poll_client::{ErrorCallback, EventCallback, PollClient, PollState};
pub use retry::BackoffStrategy;
pub use subscription::{PollSubscription, SubscriptionOptions, SubscriptionStatus};
pub use transport::{HttpTransport, PollResponse, PollTransport};
