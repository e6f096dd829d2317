//! # Retry Backoff
//!
//! Delay between a failed poll and its retry.
//!
//! - **Fixed**: the same interval after every failure (2000 ms by default)
//! - **Exponential**: doubles per consecutive failure up to a cap, plus
//!   random jitter so many clients do not retry in lockstep
//!
//! The poll client counts consecutive failures and resets the count after
//! any successful response.

use std::time::Duration;

use rand::Rng;

use crate::shared::protocol::DEFAULT_RETRY_DELAY;

/// Backoff strategy configuration
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Fixed interval between retries
    Fixed { interval: Duration },
    /// Exponential backoff with jitter
    Exponential {
        /// Delay after the first failure
        base: Duration,
        /// Ceiling before jitter
        max: Duration,
        /// Jitter factor (0.0 to 1.0) of the capped delay; out-of-range
        /// values are clamped and non-finite ones disable jitter
        jitter: f64,
    },
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::Fixed {
            interval: DEFAULT_RETRY_DELAY,
        }
    }
}

impl BackoffStrategy {
    /// Delay before retry number `attempt` (1 after the first failure)
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { interval } => *interval,
            Self::Exponential { base, max, jitter } => {
                let exponent = attempt.saturating_sub(1).min(31);
                let delay = base.saturating_mul(1u32 << exponent).min(*max);

                // NaN or infinite jitter counts as none
                let jitter = if jitter.is_finite() { jitter.clamp(0.0, 1.0) } else { 0.0 };
                if jitter == 0.0 || delay.is_zero() {
                    return delay;
                }
                let factor = rand::thread_rng().gen_range(0.0..=jitter);
                let extra = Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(delay);
                delay.saturating_add(extra)
            }
        }
    }
}
