//! Poll Module
//!
//! The HTTP long-poll endpoints. Handlers authorize the caller for a
//! channel, delegate to `ChannelSubscriber::wait` with the channel's
//! deadline and map the outcome to a status code.
//!
//! ```text
//! poll/
//! ├── mod.rs          - Module exports and the no-store response layer
//! └── handlers.rs     - GET /poll/feed, GET /poll/thread
//! ```

pub mod handlers;

pub use handlers::{handle_feed_poll, handle_thread_poll, ThreadPollParams};

use axum::{
    http::{header::CACHE_CONTROL, HeaderValue},
    response::Response,
};

/// Mark a poll response as uncacheable
///
/// Applied with `axum::middleware::map_response` so error responses are
/// covered too.
pub async fn no_store(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
