//! Retry policy for transient failures.
//!
//! The policy is a pure decision: given how many retries a logical call has
//! already made and the kind of the latest failure, it says whether to try again
//! and how long to wait first. The counter itself lives in a [`RetryState`] that
//! the client creates for each logical call.

use crate::ErrorKind;
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Outcome of a retry decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait for the given delay, then issue the request again.
    Retry(Duration),
    /// Stop and surface the failure.
    GiveUp,
}

/// Exponential backoff without jitter.
///
/// The n-th retry (1-indexed) waits `base_delay * 2^(n - 1)`.
///
/// # Examples
///
/// ```
/// use canvas_api::{ErrorKind, RetryDecision, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(100));
///
/// assert_eq!(
///     policy.should_retry(0, ErrorKind::ServerError),
///     RetryDecision::Retry(Duration::from_millis(100))
/// );
/// assert_eq!(
///     policy.should_retry(2, ErrorKind::RateLimited),
///     RetryDecision::Retry(Duration::from_millis(400))
/// );
/// assert_eq!(policy.should_retry(3, ErrorKind::Network), RetryDecision::GiveUp);
/// assert_eq!(policy.should_retry(0, ErrorKind::ClientError), RetryDecision::GiveUp);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// The maximum number of retries per logical call.
    pub max_retries: u32,
    /// The delay before the first retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the given budget and base delay.
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Decides what to do after a failure of the given kind.
    ///
    /// `attempt` is the number of retries already made in this logical call.
    pub fn should_retry(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if !kind.is_retryable() {
            return RetryDecision::GiveUp;
        }
        match attempt
            .checked_add(1)
            .and_then(|next| self.delay_for_attempt(next))
        {
            Some(delay) => RetryDecision::Retry(delay),
            None => RetryDecision::GiveUp,
        }
    }

    /// Returns the delay before the given retry (1-indexed), or `None` once the
    /// budget is exhausted.
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_retries {
            return None;
        }
        let multiplier = 2u32.saturating_pow(attempt - 1);
        Some(self.base_delay.saturating_mul(multiplier))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_BASE_DELAY)
    }
}

/// Per-call bookkeeping, owned by the client for the duration of one logical call.
#[derive(Debug, Default)]
pub(crate) struct RetryState {
    retries: u32,
    attempts: u32,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one physical attempt and returns its 1-indexed number.
    pub fn begin_attempt(&mut self) -> u32 {
        self.attempts += 1;
        self.attempts
    }

    /// Records a retry about to be performed.
    pub fn record_retry(&mut self) {
        self.retries += 1;
    }

    /// Retries made so far.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Physical attempts made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff_delays() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(1000)));
        assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(2000)));
        assert_eq!(policy.delay_for_attempt(3), Some(Duration::from_millis(4000)));
        assert_eq!(policy.delay_for_attempt(4), None);
        assert_eq!(policy.delay_for_attempt(0), None);
    }

    #[test]
    fn test_retryable_kinds_follow_backoff() {
        let policy = RetryPolicy::new(5, Duration::from_millis(10));

        for kind in [
            ErrorKind::Network,
            ErrorKind::RateLimited,
            ErrorKind::ServerError,
        ] {
            let delays: Vec<_> = (0..6).map(|n| policy.should_retry(n, kind)).collect();
            assert_eq!(
                delays,
                vec![
                    RetryDecision::Retry(Duration::from_millis(10)),
                    RetryDecision::Retry(Duration::from_millis(20)),
                    RetryDecision::Retry(Duration::from_millis(40)),
                    RetryDecision::Retry(Duration::from_millis(80)),
                    RetryDecision::Retry(Duration::from_millis(160)),
                    RetryDecision::GiveUp,
                ]
            );
        }
    }

    #[test]
    fn test_retry_counter_at_limit_gives_up() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_millis(1));

        assert_eq!(
            policy.should_retry(u32::MAX, ErrorKind::Network),
            RetryDecision::GiveUp
        );
        assert!(matches!(
            policy.should_retry(u32::MAX - 1, ErrorKind::Network),
            RetryDecision::Retry(_)
        ));
    }

    #[test]
    fn test_non_retryable_kinds() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.should_retry(0, ErrorKind::ClientError),
            RetryDecision::GiveUp
        );
        assert_eq!(policy.should_retry(0, ErrorKind::Unknown), RetryDecision::GiveUp);
    }

    #[test]
    fn test_no_retry() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.should_retry(0, ErrorKind::Network), RetryDecision::GiveUp);
    }

    #[test]
    fn test_large_attempt_saturates() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_secs(1));
        assert!(policy.delay_for_attempt(64).is_some());
    }

    #[test]
    fn test_retry_state() {
        let mut state = RetryState::new();
        assert_eq!(state.begin_attempt(), 1);
        state.record_retry();
        assert_eq!(state.begin_attempt(), 2);
        assert_eq!(state.retries(), 1);
        assert_eq!(state.attempts(), 2);
    }
}
