//! Plain-data form of a retry policy.
//!
//! `RetryConfig` mirrors the options a caller hands to the executor:
//! `retryable_vals`, `retryable_exceptions` and `max_attempts`. With the
//! `serde` feature enabled it can be loaded from any serde format; missing
//! fields take their defaults and unknown fields are rejected.
//!
//! ```rust
//! use reprise::{RetryConfig, RetryPolicy};
//! use std::io;
//!
//! let config = RetryConfig {
//!     retryable_vals: vec![0],
//!     retryable_exceptions: vec![io::ErrorKind::TimedOut],
//!     max_attempts: 3,
//! };
//!
//! let policy = RetryPolicy::try_from(config).unwrap();
//! assert_eq!(policy.max_attempts(), 3);
//! assert_eq!(policy.retryable_vals(), &[0]);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::PolicyError;
use super::policy::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};

/// Serializable retry options.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct RetryConfig<V, K> {
    /// Return values that trigger another attempt.
    pub retryable_vals: Vec<V>,
    /// Error kinds that trigger another attempt.
    pub retryable_exceptions: Vec<K>,
    /// Maximum number of invocations, including the first.
    pub max_attempts: u32,
}

impl<V, K> Default for RetryConfig<V, K> {
    fn default() -> Self {
        Self {
            retryable_vals: Vec::new(),
            retryable_exceptions: Vec::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl<V, K> TryFrom<RetryConfig<V, K>> for RetryPolicy<V, K> {
    type Error = PolicyError;

    fn try_from(config: RetryConfig<V, K>) -> Result<Self, Self::Error> {
        let policy = RetryPolicy::new()
            .with_retryable_vals(config.retryable_vals)
            .with_retryable_kinds(config.retryable_exceptions)
            .with_max_attempts(config.max_attempts);
        policy.validate()?;
        Ok(policy)
    }
}

impl<V: Clone, K: Clone> RetryPolicy<V, K> {
    /// Snapshot this policy as plain configuration.
    pub fn to_config(&self) -> RetryConfig<V, K> {
        RetryConfig {
            retryable_vals: self.retryable_vals().to_vec(),
            retryable_exceptions: self.retryable_kinds().to_vec(),
            max_attempts: self.max_attempts(),
        }
    }
}
