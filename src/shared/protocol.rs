//! Long-poll protocol constants shared by server and client.

use std::time::Duration;

/// How long the server holds a poll open before answering 204.
pub const DEFAULT_POLL_DEADLINE: Duration = Duration::from_secs(60);

/// Delay before the client retries after a failed poll.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2000);

/// Extra time the client allows on top of the server deadline before it
/// gives up on a request itself.
pub const REQUEST_GRACE: Duration = Duration::from_secs(5);

/// Route of the global feed poll endpoint.
pub const FEED_POLL_PATH: &str = "/poll/feed";

/// Route of the per-thread poll endpoint.
pub const THREAD_POLL_PATH: &str = "/poll/thread";

/// Query parameter carrying the thread id on the thread poll endpoint.
pub const THREAD_ID_PARAM: &str = "threadId";

/// Default cap on simultaneously held server-side listeners.
pub const DEFAULT_MAX_LISTENERS: usize = 64;
