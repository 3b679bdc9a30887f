use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised when a retry schedule is constructed with invalid knobs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RetryError {
    /// At least one attempt must be permitted.
    #[error("max attempts must be positive")]
    ZeroMaxAttempts,
    /// Backoff doubling needs a positive starting point.
    #[error("base backoff must be positive")]
    ZeroBaseBackoff,
}

/// Retry budget and backoff base for one logical operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_backoff_ms: u64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), RetryError> {
        if self.max_attempts == 0 {
            return Err(RetryError::ZeroMaxAttempts);
        }
        if self.base_backoff_ms == 0 {
            return Err(RetryError::ZeroBaseBackoff);
        }
        Ok(())
    }
}

/// Per-operation retry/backoff state machine.
///
/// Backoff doubles on every consecutive failure and resets completely on any
/// success. Created per logical operation and discarded once the operation
/// completes or the attempt budget is exhausted.
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    config: RetryConfig,
    current_attempt: u32,
    backoff_ms: u64,
}

impl RetrySchedule {
    /// Builds a fresh schedule, rejecting non-positive knobs up front.
    pub fn new(config: RetryConfig) -> Result<Self, RetryError> {
        config.validate()?;
        Ok(Self {
            config,
            current_attempt: 0,
            backoff_ms: config.base_backoff_ms,
        })
    }

    /// Whether another attempt is still within budget.
    pub fn should_retry(&self) -> bool {
        self.current_attempt < self.config.max_attempts
    }

    /// Records the outcome of an attempt.
    ///
    /// A failure past the attempt budget is a no-op so exhausted schedules
    /// never corrupt their counters.
    pub fn record_attempt(&mut self, success: bool) {
        if success {
            self.current_attempt = 0;
            self.backoff_ms = self.config.base_backoff_ms;
            return;
        }
        if !self.should_retry() {
            return;
        }
        self.current_attempt += 1;
        self.backoff_ms = doubled_backoff(self.config.base_backoff_ms, self.current_attempt);
        if !self.should_retry() {
            warn!(
                "event=retry_exhausted attempts={} backoff_ms={}",
                self.current_attempt, self.backoff_ms
            );
        }
    }

    /// Failures recorded since the last success.
    pub fn current_attempt(&self) -> u32 {
        self.current_attempt
    }

    /// Delay the caller should wait before the next attempt.
    pub fn backoff_ms(&self) -> u64 {
        self.backoff_ms
    }

    /// Whether the attempt budget has been spent.
    pub fn exhausted(&self) -> bool {
        !self.should_retry()
    }
}

fn doubled_backoff(base_ms: u64, attempt: u32) -> u64 {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    base_ms.saturating_mul(factor)
}
