//! Error types for retry operations.

use std::fmt;

/// Error returned when a retried operation does not produce an acceptable value.
///
/// The operation's own errors are carried unchanged; the variant only records
/// how the executor came to give up.
///
/// # Examples
///
/// ```rust
/// use reprise::{RetryError, RetryPolicy};
/// use std::io;
///
/// let policy = RetryPolicy::new()
///     .with_retryable_kind(io::ErrorKind::TimedOut)
///     .with_max_attempts(2);
///
/// let result = policy.execute(|| Err::<(), _>(io::Error::from(io::ErrorKind::TimedOut)));
///
/// match result {
///     Err(RetryError::Retryable(err)) => assert_eq!(err.kind(), io::ErrorKind::TimedOut),
///     other => panic!("expected the last retryable error, got {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// The operation failed with an error outside the retryable set.
    ///
    /// Returned on first occurrence; no further attempts were made.
    NonRetryable(E),
    /// Attempts ran out and a retryable error had been caught along the way.
    ///
    /// Holds the most recently caught retryable error, even when later attempts
    /// failed by returning a disallowed value instead.
    Retryable(E),
    /// Attempts ran out and every failure was a disallowed return value.
    AttemptsExhausted,
}

impl<E> RetryError<E> {
    /// Returns true if the operation failed with a non-retryable error.
    pub fn is_non_retryable(&self) -> bool {
        matches!(self, Self::NonRetryable(_))
    }

    /// Returns true if attempts ran out on a recorded retryable error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }

    /// Returns true if attempts ran out without any recorded error.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::AttemptsExhausted)
    }

    /// Get a reference to the operation's error, if one is carried.
    pub fn inner(&self) -> Option<&E> {
        match self {
            Self::NonRetryable(e) | Self::Retryable(e) => Some(e),
            Self::AttemptsExhausted => None,
        }
    }

    /// Extract the operation's error, if one is carried.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::NonRetryable(e) | Self::Retryable(e) => Some(e),
            Self::AttemptsExhausted => None,
        }
    }

    /// Collapse into the operation's own error type.
    ///
    /// Errors produced by the operation come back exactly as they were raised;
    /// exhaustion is converted through `From<AttemptsExhausted>`.
    pub fn flatten(self) -> E
    where
        E: From<AttemptsExhausted>,
    {
        match self {
            Self::NonRetryable(e) | Self::Retryable(e) => e,
            Self::AttemptsExhausted => E::from(AttemptsExhausted),
        }
    }

    /// Transform the carried error, keeping the variant.
    pub fn map_err<F, G>(self, f: G) -> RetryError<F>
    where
        G: FnOnce(E) -> F,
    {
        match self {
            Self::NonRetryable(e) => RetryError::NonRetryable(f(e)),
            Self::Retryable(e) => RetryError::Retryable(f(e)),
            Self::AttemptsExhausted => RetryError::AttemptsExhausted,
        }
    }
}

impl<E> From<AttemptsExhausted> for RetryError<E> {
    fn from(_: AttemptsExhausted) -> Self {
        Self::AttemptsExhausted
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonRetryable(e) | Self::Retryable(e) => write!(f, "{}", e),
            Self::AttemptsExhausted => write!(f, "{}", AttemptsExhausted),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NonRetryable(e) | Self::Retryable(e) => Some(e),
            Self::AttemptsExhausted => None,
        }
    }
}

/// Marker error for a retry loop that ran out of attempts on disallowed values.
///
/// Carries no cause. Implement `From<AttemptsExhausted>` for your own error type
/// to use [`RetryPolicy::run`](crate::RetryPolicy::run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttemptsExhausted;

impl fmt::Display for AttemptsExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no attempts remaining")
    }
}

impl std::error::Error for AttemptsExhausted {}

/// Error returned when a retry policy is not usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    /// `max_attempts` was zero, so the operation could never run.
    ZeroMaxAttempts,
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroMaxAttempts => write!(f, "max_attempts must be at least 1"),
        }
    }
}

impl std::error::Error for PolicyError {}
