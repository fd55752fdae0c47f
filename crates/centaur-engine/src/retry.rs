//! Bounded retry with backoff.
//!
//! [`retry_bounded`] runs an operation up to `max_attempts` times, calling a
//! failure handler after each failed attempt and sleeping between attempts.
//! It never sleeps after the last attempt, so the total time spent waiting
//! is at most `(max_attempts - 1)` backoff intervals.

use std::time::Duration;
use tracing::debug;

/// Delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Retry immediately.
    None,
    /// Same delay after every failure.
    Fixed(Duration),
    /// `base`, `2 * base`, `4 * base`, ... capped at `max`.
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Delay after the failed attempt with zero-based index `attempt`.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        match *self {
            Self::None => Duration::ZERO,
            Self::Fixed(delay) => delay,
            Self::Exponential { base, max } => {
                let factor = 2u32.saturating_pow(attempt);
                base.saturating_mul(factor).min(max)
            }
        }
    }
}

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    /// Creates a policy. At least one attempt is always made.
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Fixed delay between attempts.
    #[must_use]
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::new(max_attempts, Backoff::Fixed(delay))
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn backoff(&self) -> Backoff {
        self.backoff
    }
}

/// Runs `op` until it succeeds or the policy's attempts are used up.
///
/// `state` is threaded through both closures so that the operation and the
/// failure handler can share mutable state (for example the process slot
/// the operation uses and the handler discards).
///
/// Returns `None` when every attempt failed. Errors are handed to
/// `on_failure` and never returned.
pub fn retry_bounded<S, T, E>(
    policy: &RetryPolicy,
    state: &mut S,
    mut op: impl FnMut(&mut S, u32) -> Result<T, E>,
    mut on_failure: impl FnMut(&mut S, u32, E),
) -> Option<T> {
    for attempt in 0..policy.max_attempts {
        match op(state, attempt) {
            Ok(value) => return Some(value),
            Err(err) => {
                on_failure(state, attempt, err);

                if attempt + 1 < policy.max_attempts {
                    let delay = policy.backoff.delay(attempt);
                    if !delay.is_zero() {
                        debug!(
                            "retry {}/{} after {delay:?}",
                            attempt + 2,
                            policy.max_attempts
                        );
                        std::thread::sleep(delay);
                    }
                }
            }
        }
    }
    None
}
