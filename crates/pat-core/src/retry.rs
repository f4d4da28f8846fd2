//! Bounded-attempt retry engine shared by directory binds and token API calls.
//!
//! Each attempt reports one of three outcomes. Success and permanent failure
//! stop the loop immediately; a transient failure sleeps for the configured
//! delay and tries again until the attempt budget is spent. The delay only
//! ever happens between attempts, never after the last one.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::ExitReason;

pub const DEFAULT_MAX_ATTEMPTS: usize = 10;
pub const DEFAULT_SECONDS_BETWEEN_ATTEMPTS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryConfigError {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Attempt budget and fixed delay, built once from configuration.
pub struct RetryConfig {
    max_attempts: NonZeroUsize,
    delay_between_attempts: Duration,
}

impl RetryConfig {
    pub fn new(
        max_attempts: usize,
        delay_between_attempts: Duration,
    ) -> Result<Self, RetryConfigError> {
        let max_attempts = NonZeroUsize::new(max_attempts).ok_or(RetryConfigError::ZeroAttempts)?;
        Ok(Self {
            max_attempts,
            delay_between_attempts,
        })
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts.get()
    }

    pub fn delay_between_attempts(&self) -> Duration {
        self.delay_between_attempts
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: NonZeroUsize::new(DEFAULT_MAX_ATTEMPTS).unwrap_or(NonZeroUsize::MIN),
            delay_between_attempts: Duration::from_secs(DEFAULT_SECONDS_BETWEEN_ATTEMPTS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of a single attempt.
pub enum OperationOutcome<T> {
    Success(T),
    /// Backend not ready yet; worth another attempt.
    TransientFailure(String),
    /// Retrying cannot help; abort with the carried exit reason.
    PermanentFailure(String, ExitReason),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetryError {
    #[error("{operation}: giving up after {attempts} attempts ({last_reason})")]
    Exhausted {
        operation: String,
        attempts: usize,
        last_reason: String,
    },
    #[error("{operation}: {reason}")]
    Permanent {
        operation: String,
        reason: String,
        exit: ExitReason,
    },
}

impl RetryError {
    pub fn exit_reason(&self) -> ExitReason {
        match self {
            RetryError::Exhausted { .. } => ExitReason::AttemptsExhausted,
            RetryError::Permanent { exit, .. } => *exit,
        }
    }
}

/// Blocks the calling thread between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

impl<S: Sleeper + ?Sized> Sleeper for &S {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Default)]
/// Records requested delays instead of sleeping.
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delays(&self) -> Vec<Duration> {
        match self.delays.lock() {
            Ok(delays) => delays.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        match self.delays.lock() {
            Ok(mut delays) => delays.push(duration),
            Err(poisoned) => poisoned.into_inner().push(duration),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy<S = ThreadSleeper> {
    config: RetryConfig,
    sleeper: S,
}

impl RetryPolicy<ThreadSleeper> {
    pub fn new(config: RetryConfig) -> Self {
        Self::with_sleeper(config, ThreadSleeper)
    }
}

impl<S: Sleeper> RetryPolicy<S> {
    pub fn with_sleeper(config: RetryConfig, sleeper: S) -> Self {
        Self { config, sleeper }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Runs `attempt` (called with the 1-based attempt number) until it
    /// succeeds, fails permanently, or the attempt budget is spent.
    pub fn execute<T, F>(&self, operation: &str, mut attempt: F) -> Result<T, RetryError>
    where
        F: FnMut(usize) -> OperationOutcome<T>,
    {
        let max_attempts = self.config.max_attempts();
        let delay = self.config.delay_between_attempts();
        let mut last_reason = String::new();

        for attempt_number in 1..=max_attempts {
            match attempt(attempt_number) {
                OperationOutcome::Success(value) => return Ok(value),
                OperationOutcome::PermanentFailure(reason, exit) => {
                    error!(
                        operation,
                        attempt = attempt_number,
                        exit_reason = %exit,
                        "{reason}"
                    );
                    return Err(RetryError::Permanent {
                        operation: operation.to_string(),
                        reason,
                        exit,
                    });
                }
                OperationOutcome::TransientFailure(reason) => {
                    warn!(
                        operation,
                        attempt = attempt_number,
                        max_attempts,
                        "{reason}"
                    );
                    last_reason = reason;
                }
            }

            let remaining = max_attempts - attempt_number;
            if remaining > 0 {
                info!(
                    operation,
                    remaining_attempts = remaining,
                    "trying again in {} seconds",
                    delay.as_secs()
                );
                self.sleeper.sleep(delay);
            }
        }

        error!(
            operation,
            max_attempts, "giving up, reached maximum attempts ({max_attempts})"
        );
        Err(RetryError::Exhausted {
            operation: operation.to_string(),
            attempts: max_attempts,
            last_reason,
        })
    }
}
