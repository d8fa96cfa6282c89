//! Retry policy types and configuration.

use super::error::PolicyError;
use super::kind::Kinded;

/// Number of attempts a policy allows when none is configured.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// A retry policy describing which outcomes count as failures and how many
/// attempts an operation gets.
///
/// Policies are pure data - they describe retry behavior but don't execute it.
/// This makes them easy to test, clone, and inspect. Execution lives on the
/// same type (see [`RetryPolicy::execute`]) but never mutates the policy.
///
/// An operation's outcome is a failure when either:
/// - it returned a value listed in `retryable_vals`, or
/// - it returned an error whose [`Kinded::kind`] is listed in `retryable_kinds`.
///
/// Any other error is fatal and propagates on first occurrence.
///
/// # Examples
///
/// ```rust
/// use reprise::RetryPolicy;
/// use std::io;
///
/// let policy = RetryPolicy::new()
///     .with_retryable_val(None)
///     .with_retryable_kind(io::ErrorKind::TimedOut)
///     .with_max_attempts(3);
///
/// assert_eq!(policy.max_attempts(), 3);
/// assert!(policy.is_retryable_value(&None::<u32>));
/// assert!(!policy.is_retryable_value(&Some(7)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy<T, K> {
    retryable_vals: Vec<T>,
    retryable_kinds: Vec<K>,
    max_attempts: u32,
}

/// How a single invocation of the wrapped operation is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T, E> {
    /// An acceptable value; the loop ends and the value is returned.
    Success(T),
    /// A value listed as retryable; counts as a failed attempt.
    RetryableValue(T),
    /// An error of a retryable kind; recorded and counted as a failed attempt.
    RetryableError(E),
    /// An error outside the retryable set; propagated immediately.
    Fatal(E),
}

impl<T, E> Outcome<T, E> {
    /// Returns true if the outcome ends the loop with a value.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true if the outcome consumes an attempt and allows another.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RetryableValue(_) | Self::RetryableError(_))
    }

    /// Returns true if the outcome aborts the loop with an error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

/// What made an attempt fail, passed to hooks.
#[derive(Debug)]
pub enum RetryCause<'a, T, E> {
    /// The operation returned a value listed as retryable.
    Value(&'a T),
    /// The operation returned an error of a retryable kind.
    Error(&'a E),
}

// Manual Clone/Copy here and on `RetryEvent`: derives would require `T: Clone`/`E: Clone`
// even though only references are held.
impl<T, E> Clone for RetryCause<'_, T, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, E> Copy for RetryCause<'_, T, E> {}

/// Information about a failed attempt, passed to hooks.
#[derive(Debug)]
pub struct RetryEvent<'a, T, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The configured attempt ceiling.
    pub max_attempts: u32,
    /// Why the attempt failed.
    pub cause: RetryCause<'a, T, E>,
    /// Whether another attempt follows.
    pub will_retry: bool,
}

impl<T, E> Clone for RetryEvent<'_, T, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, E> Copy for RetryEvent<'_, T, E> {}

impl<T, K> RetryPolicy<T, K> {
    /// Create a policy that accepts every value, retries no errors, and allows
    /// [`DEFAULT_MAX_ATTEMPTS`] attempts.
    pub fn new() -> Self {
        Self {
            retryable_vals: Vec::new(),
            retryable_kinds: Vec::new(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Add values that, when returned, trigger another attempt.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reprise::RetryPolicy;
    ///
    /// let policy = RetryPolicy::<_, ()>::new().with_retryable_vals([0, -1]);
    ///
    /// assert!(policy.is_retryable_value(&-1));
    /// assert!(!policy.is_retryable_value(&1));
    /// ```
    pub fn with_retryable_vals<I>(mut self, vals: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        self.retryable_vals.extend(vals);
        self
    }

    /// Add a single value that triggers another attempt.
    pub fn with_retryable_val(mut self, val: T) -> Self {
        self.retryable_vals.push(val);
        self
    }

    /// Add error kinds that trigger another attempt.
    pub fn with_retryable_kinds<I>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        self.retryable_kinds.extend(kinds);
        self
    }

    /// Add a single error kind that triggers another attempt.
    pub fn with_retryable_kind(mut self, kind: K) -> Self {
        self.retryable_kinds.push(kind);
        self
    }

    /// Set the maximum number of invocations, including the first one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reprise::RetryPolicy;
    ///
    /// let policy = RetryPolicy::<(), ()>::new().with_max_attempts(3);
    /// assert_eq!(policy.max_attempts(), 3);
    /// ```
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n;
        self
    }

    /// Get the retryable values.
    pub fn retryable_vals(&self) -> &[T] {
        &self.retryable_vals
    }

    /// Get the retryable error kinds.
    pub fn retryable_kinds(&self) -> &[K] {
        &self.retryable_kinds
    }

    /// Get the maximum number of attempts.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Validate that the policy allows at least one attempt.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.max_attempts == 0 {
            Err(PolicyError::ZeroMaxAttempts)
        } else {
            Ok(())
        }
    }
}

impl<T: PartialEq, K: PartialEq> RetryPolicy<T, K> {
    /// Returns true if `value` is listed as retryable.
    ///
    /// Always false when no retryable values are configured.
    pub fn is_retryable_value(&self, value: &T) -> bool {
        self.retryable_vals.contains(value)
    }

    /// Returns true if the kind of `error` is listed as retryable.
    pub fn is_retryable_error<E>(&self, error: &E) -> bool
    where
        E: Kinded<Kind = K>,
    {
        let kind = error.kind();
        self.retryable_kinds.iter().any(|k| *k == kind)
    }

    /// Classify the result of one invocation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reprise::{Outcome, RetryPolicy};
    /// use std::io;
    ///
    /// let policy = RetryPolicy::new()
    ///     .with_retryable_val(0)
    ///     .with_retryable_kind(io::ErrorKind::Interrupted);
    ///
    /// assert!(matches!(policy.classify::<io::Error>(Ok(1)), Outcome::Success(1)));
    /// assert!(matches!(policy.classify::<io::Error>(Ok(0)), Outcome::RetryableValue(0)));
    ///
    /// let interrupted = io::Error::from(io::ErrorKind::Interrupted);
    /// assert!(policy.classify(Err(interrupted)).is_retryable());
    ///
    /// let missing = io::Error::from(io::ErrorKind::NotFound);
    /// assert!(policy.classify(Err(missing)).is_fatal());
    /// ```
    pub fn classify<E>(&self, result: Result<T, E>) -> Outcome<T, E>
    where
        E: Kinded<Kind = K>,
    {
        match result {
            Ok(value) if self.is_retryable_value(&value) => Outcome::RetryableValue(value),
            Ok(value) => Outcome::Success(value),
            Err(error) if self.is_retryable_error(&error) => Outcome::RetryableError(error),
            Err(error) => Outcome::Fatal(error),
        }
    }
}

impl<T, K> Default for RetryPolicy<T, K> {
    fn default() -> Self {
        Self::new()
    }
}
