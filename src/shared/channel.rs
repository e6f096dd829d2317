//! Channel Keys
//!
//! A channel key names one notification topic. The server listens on it,
//! producers notify on it, and clients poll it. Two families exist today:
//!
//! - `feed:global` - the global feed, one channel for every post
//! - `thread:<uuid>` - one channel per message thread
//!
//! Keys double as PostgreSQL channel identifiers, so they are limited to
//! 63 bytes and a conservative character set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Longest identifier PostgreSQL accepts without truncation (NAMEDATALEN - 1).
pub const MAX_CHANNEL_KEY_LEN: usize = 63;

const FEED_PREFIX: &str = "feed";
const THREAD_PREFIX: &str = "thread";

/// A validated notification channel name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ChannelKey(String);

/// The family a channel key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelFamily {
    /// The single global feed channel
    Feed,
    /// A per-thread channel
    Thread(Uuid),
    /// Anything else; valid as a channel name but not routed by the server
    Other,
}

impl ChannelKey {
    /// Build a key from an arbitrary name, validating it
    pub fn new(name: impl Into<String>) -> Result<Self, SharedError> {
        let name = name.into();

        if name.is_empty() {
            return Err(SharedError::validation("channel", "channel key cannot be empty"));
        }

        if name.len() > MAX_CHANNEL_KEY_LEN {
            return Err(SharedError::validation(
                "channel",
                format!("channel key exceeds {} bytes", MAX_CHANNEL_KEY_LEN),
            ));
        }

        if let Some(bad) = name.chars().find(|c| !is_channel_char(*c)) {
            return Err(SharedError::validation(
                "channel",
                format!("channel key contains invalid character {:?}", bad),
            ));
        }

        Ok(Self(name))
    }

    /// The global feed channel (`feed:global`)
    pub fn feed() -> Self {
        Self(format!("{}:global", FEED_PREFIX))
    }

    /// The channel for one message thread (`thread:<uuid>`)
    pub fn thread(thread_id: Uuid) -> Self {
        // A hyphenated uuid is 36 bytes, well under the identifier limit.
        Self(format!("{}:{}", THREAD_PREFIX, thread_id))
    }

    /// Classify the key by family
    pub fn family(&self) -> ChannelFamily {
        match self.0.split_once(':') {
            Some((FEED_PREFIX, "global")) => ChannelFamily::Feed,
            Some((THREAD_PREFIX, id)) => Uuid::parse_str(id)
                .map(ChannelFamily::Thread)
                .unwrap_or(ChannelFamily::Other),
            _ => ChannelFamily::Other,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_channel_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-')
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChannelKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ChannelKey {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ChannelKey {
    type Error = SharedError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChannelKey> for String {
    fn from(key: ChannelKey) -> Self {
        key.0
    }
}
