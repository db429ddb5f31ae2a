//! Bounded retries for station transfers.
//!
//! The station occasionally returns garbage or nothing at all, so every
//! block transfer gets a fixed number of attempts. Attempts follow each
//! other immediately unless a delay is configured.
//!
//! # Example
//!
//! ```
//! use wsp_core::{RetryConfig, with_retry, Error};
//!
//! let config = RetryConfig::default();
//! let value = with_retry(&config, "read_block", || Ok::<_, Error>(42)).unwrap();
//! assert_eq!(value, 42);
//! ```

use std::thread::sleep;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Number of attempts for every transfer unless configured otherwise.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Total attempts including the first one (at least 1).
    pub max_attempts: u32,
    /// Pause between attempts.
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_ATTEMPTS,
            delay: Duration::ZERO,
        }
    }
}

impl RetryConfig {
    /// Create a config with the given number of attempts.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    /// A single attempt.
    pub fn none() -> Self {
        Self::new(1)
    }

    /// Set the pause between attempts.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Run `operation` until it succeeds, fails with a non-transient error, or
/// runs out of attempts.
///
/// # Errors
///
/// Returns the last error seen.
pub fn with_retry<T, F>(config: &RetryConfig, operation_name: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let attempts = config.attempts();
    let mut attempt = 1;

    loop {
        match operation() {
            Ok(value) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(value);
            }
            Err(e) if e.is_transient() && attempt < attempts => {
                warn!(
                    "{} failed (attempt {}/{}): {}",
                    operation_name, attempt, attempts, e
                );
                if !config.delay.is_zero() {
                    sleep(config.delay);
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Whether `error` is worth another attempt.
pub fn is_retryable(error: &Error) -> bool {
    error.is_transient()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert!(config.delay.is_zero());
    }

    #[test]
    fn test_retry_config_none() {
        assert_eq!(RetryConfig::none().max_attempts, 1);
        assert_eq!(RetryConfig::new(0).attempts(), 1);
    }

    #[test]
    fn test_with_retry_immediate_success() {
        let config = RetryConfig::default();
        let result = with_retry(&config, "test", || Ok::<_, Error>(42));
        assert_eq!(result.unwrap(), 42);
    }

    #[test]
    fn test_with_retry_eventual_success() {
        let config = RetryConfig::default();
        let mut calls = 0;
        let result = with_retry(&config, "test", || {
            calls += 1;
            if calls < 3 {
                Err(Error::read_failed(0, "transient"))
            } else {
                Ok(7)
            }
        });
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_with_retry_all_fail() {
        let config = RetryConfig::default();
        let mut calls = 0;
        let result: Result<()> = with_retry(&config, "test", || {
            calls += 1;
            Err(Error::read_failed(0x100, "persistent"))
        });
        assert!(matches!(result, Err(Error::ReadFailed { address: 0x100, .. })));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_with_retry_non_retryable_error() {
        let config = RetryConfig::default();
        let mut calls = 0;
        let result: Result<()> = with_retry(&config, "test", || {
            calls += 1;
            Err(Error::unsupported("write"))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_is_retryable() {
        assert!(is_retryable(&Error::read_failed(0, "x")));
        assert!(!is_retryable(&Error::InvalidAddress(0x10000)));
    }
}
