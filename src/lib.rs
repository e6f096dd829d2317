//! pollcast - Main Library
//!
//! HTTP long-polling on top of PostgreSQL `LISTEN`/`NOTIFY`. A client asks
//! "tell me when something changes on this channel"; the server holds the
//! request open until a notification arrives (200 with the event) or the
//! deadline passes (204), and the client immediately asks again.
//!
//! # Module Structure
//!
//! - **`shared`** - Types both sides agree on
//!   - Channel keys (`feed:global`, `thread:<uuid>`)
//!   - Change events and the poll envelope
//!   - Protocol timing and configuration
//!
//! - **`backend`** - Server-side code (only compiled with `ssr` feature)
//!   - Channel subscription `wait` with a bounded listener budget
//!   - Poll endpoints, event producers, bearer authentication
//!   - Postgres and in-memory notifier backends
//!
//! - **`client`** - Native poll client
//!   - `Idle`/`Polling` state machine with abortable requests and retries
//!   - `PollSubscription` configure handle
//!
//! # Feature Flags
//!
//! - **`ssr`** - Server build (axum, JWT sessions); enabled by default
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pollcast::client::{Config, HttpTransport, PollClient};
//! use pollcast::shared::ChannelKey;
//!
//! # async fn example() -> Result<(), pollcast::client::PollError> {
//! let transport = Arc::new(HttpTransport::new(Config::new().with_token("jwt"))?);
//! let client = PollClient::new(transport, ChannelKey::feed())
//!     .on_event(|envelope| println!("{}", envelope.event));
//! client.start();
//! // ...
//! client.stop().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` for validation and serialization
//! - `backend::BackendError` maps to JSON error responses
//! - `client::PollError` reaches the client's error callback

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;

/// Poll client
/// Only compiled for native targets (not WASM)
#[cfg(not(target_arch = "wasm32"))]
pub mod client;
