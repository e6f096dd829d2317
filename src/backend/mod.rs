//! Backend Module
//!
//! The long-poll server: an Axum application that holds each poll request
//! open on a PostgreSQL `LISTEN` (or an in-process hub) until a producer
//! publishes on the channel or the deadline passes.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`realtime`** - listeners, the listener budget and `wait`
//! - **`poll`** - `GET /poll/feed` and `GET /poll/thread`
//! - **`feed`** - feed posts; publishes `post_created`
//! - **`messaging`** - threads, messages, participant checks; publishes
//!   `message_sent`
//! - **`auth`** - JWT session keys
//! - **`middleware`** - bearer authentication
//! - **`server`** - configuration, state and initialization
//! - **`routes`** - router assembly and `/health`
//! - **`error`** - `BackendError` and its HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - pollcast-server binary
//! ├── realtime/       - Channel subscription core
//! ├── poll/           - Poll endpoints
//! ├── feed/           - Feed producer
//! ├── messaging/      - Thread producer and access
//! ├── auth/           - Sessions
//! ├── middleware/     - Request middleware
//! ├── server/         - Server setup
//! ├── routes/         - Route configuration
//! └── error/          - Error types
//! ```
//!
//! # Data Flow
//!
//! ```text
//! POST /threads/{id}/messages
//!   -> INSERT + pg_notify('thread:<id>', ...) in one transaction -> COMMIT
//!   -> every waiting GET /poll/thread?threadId=<id> wakes -> 200
//! no notification within the deadline -> 204
//! ```

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Channel subscription core
pub mod realtime;

/// Poll endpoints
pub mod poll;

/// Feed posts
pub mod feed;

/// Threads and thread messages
pub mod messaging;

/// Authentication
pub mod auth;

/// Request middleware
pub mod middleware;

/// Backend-specific error types
pub mod error;

pub use error::BackendError;
pub use server::{create_app, AppState, ServerConfig};
