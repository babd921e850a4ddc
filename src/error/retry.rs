/// Retry policy with exponential backoff
///
/// Sleeps `base * 2^attempt` between attempts of an operation that fails
/// transiently. The schedule has no jitter.
use std::fmt::Debug;
use std::thread;
use std::time::Duration;

/// Default number of attempts
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default base delay (100ms)
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

// 2^31 * base already exceeds any sane wait; cap the exponent to avoid overflow.
const MAX_EXPONENT: u32 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum attempts (always >= 1)
    max_retries: u32,

    /// Delay after the first failed attempt
    base_delay: Duration,
}

impl RetryPolicy {
    /// Create new policy; `max_retries` is clamped to at least one attempt
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            base_delay,
        }
    }

    /// Same base delay, different attempt count
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay to sleep after failed attempt `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(MAX_EXPONENT);
        self.base_delay.saturating_mul(factor)
    }

    /// Total sleep when every attempt fails: `base * (2^(max_retries - 1) - 1)`
    pub fn max_total_wait(&self) -> Duration {
        (0..self.max_retries - 1)
            .map(|attempt| self.delay_for(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    /// Run `operation` until it succeeds, fails non-transiently, or attempts run out.
    ///
    /// `is_transient` decides which failures are retried. No sleep follows the
    /// final attempt.
    pub fn run<T, E, F, P>(
        &self,
        sleeper: &dyn Sleeper,
        is_transient: P,
        mut operation: F,
    ) -> RetryOutcome<T, E>
    where
        F: FnMut(u32) -> Result<T, E>,
        P: Fn(&E) -> bool,
        E: Debug,
    {
        let mut last_error = None;

        for attempt in 0..self.max_retries {
            match operation(attempt) {
                Ok(value) => return RetryOutcome::Succeeded(value),
                Err(err) if is_transient(&err) => {
                    if attempt + 1 < self.max_retries {
                        let delay = self.delay_for(attempt);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max_retries = self.max_retries,
                            delay = %humantime::format_duration(delay),
                            error = ?err,
                            "Transient failure, backing off"
                        );
                        sleeper.sleep(delay);
                    }
                    last_error = Some(err);
                }
                Err(err) => return RetryOutcome::Fatal(err),
            }
        }

        match last_error {
            Some(err) => RetryOutcome::Exhausted {
                attempts: self.max_retries,
                last_error: err,
            },
            // max_retries >= 1, so the loop either returned or recorded an error
            None => unreachable!("retry loop ran zero attempts"),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY)
    }
}

/// Result of a retried operation
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    Succeeded(T),

    /// Non-transient failure, returned without retrying
    Fatal(E),

    /// Every attempt failed transiently
    Exhausted { attempts: u32, last_error: E },
}

/// Blocking pause between attempts
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}
