//! Synchronous retry execution.

use std::fmt;
use std::ops::ControlFlow;

use super::error::{AttemptsExhausted, RetryError};
use super::kind::Kinded;
use super::policy::{Outcome, RetryCause, RetryEvent, RetryPolicy};

/// Per-call bookkeeping for one run of the retry loop.
///
/// Created fresh for every call through the executor and dropped when the call
/// returns, so nothing carries over between calls.
#[derive(Debug)]
pub(crate) struct AttemptState<E> {
    attempt: u32,
    last_error: Option<E>,
}

impl<E> AttemptState<E> {
    pub(crate) fn new() -> Self {
        Self {
            attempt: 0,
            last_error: None,
        }
    }

    pub(crate) fn has_attempts_left(&self, max_attempts: u32) -> bool {
        self.attempt < max_attempts
    }

    /// Fold one classified outcome into the state.
    ///
    /// `Break` ends the loop with the call's result; `Continue` means the
    /// attempt was consumed and the caller should check the budget again.
    pub(crate) fn step<T, H>(
        &mut self,
        outcome: Outcome<T, E>,
        max_attempts: u32,
        on_retry: &mut H,
    ) -> ControlFlow<Result<T, RetryError<E>>>
    where
        H: FnMut(&RetryEvent<'_, T, E>),
    {
        match outcome {
            Outcome::Success(value) => ControlFlow::Break(Ok(value)),
            Outcome::Fatal(error) => ControlFlow::Break(Err(RetryError::NonRetryable(error))),
            Outcome::RetryableValue(value) => {
                self.attempt += 1;
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    attempt = self.attempt,
                    max_attempts,
                    "retryable value returned"
                );
                on_retry(&RetryEvent {
                    attempt: self.attempt,
                    max_attempts,
                    cause: RetryCause::Value(&value),
                    will_retry: self.attempt < max_attempts,
                });
                ControlFlow::Continue(())
            }
            Outcome::RetryableError(error) => {
                self.attempt += 1;
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    attempt = self.attempt,
                    max_attempts,
                    "retryable error caught"
                );
                on_retry(&RetryEvent {
                    attempt: self.attempt,
                    max_attempts,
                    cause: RetryCause::Error(&error),
                    will_retry: self.attempt < max_attempts,
                });
                self.last_error = Some(error);
                ControlFlow::Continue(())
            }
        }
    }

    /// The error for a loop that ran out of attempts.
    ///
    /// A retryable error recorded on any earlier attempt wins over a later
    /// disallowed value.
    pub(crate) fn into_exhausted(self) -> RetryError<E> {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempts = self.attempt,
            last_error_recorded = self.last_error.is_some(),
            "retry attempts exhausted"
        );
        match self.last_error {
            Some(error) => RetryError::Retryable(error),
            None => RetryError::AttemptsExhausted,
        }
    }
}

impl<T: PartialEq, K: PartialEq> RetryPolicy<T, K> {
    /// Run `op` until it produces an acceptable value, fails fatally, or runs
    /// out of attempts.
    ///
    /// Attempts run back to back with no delay. The operation is assumed safe
    /// to repeat; nothing is rolled back between attempts.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reprise::RetryPolicy;
    /// use std::cell::Cell;
    /// use std::io;
    ///
    /// let calls = Cell::new(0);
    /// let policy = RetryPolicy::new()
    ///     .with_retryable_kind(io::ErrorKind::Interrupted)
    ///     .with_max_attempts(3);
    ///
    /// let result = policy.execute(|| {
    ///     calls.set(calls.get() + 1);
    ///     if calls.get() < 3 {
    ///         Err(io::Error::from(io::ErrorKind::Interrupted))
    ///     } else {
    ///         Ok("done")
    ///     }
    /// });
    ///
    /// assert_eq!(result.unwrap(), "done");
    /// assert_eq!(calls.get(), 3);
    /// ```
    pub fn execute<E, F>(&self, op: F) -> Result<T, RetryError<E>>
    where
        E: Kinded<Kind = K>,
        F: FnMut() -> Result<T, E>,
    {
        self.execute_with_hooks(op, |_: &RetryEvent<'_, T, E>| {})
    }

    /// Like [`execute`](Self::execute), calling `on_retry` after every failed
    /// attempt that did not abort the loop.
    ///
    /// The hook sees the final attempt too, with `will_retry` set to false. It
    /// cannot influence control flow; use it for logging or metrics.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reprise::{RetryCause, RetryEvent, RetryPolicy};
    /// use std::convert::Infallible;
    ///
    /// let mut seen = Vec::new();
    /// let policy = RetryPolicy::<_, Infallible>::new()
    ///     .with_retryable_val(None)
    ///     .with_max_attempts(2);
    ///
    /// let result = policy.execute_with_hooks(
    ///     || Ok::<Option<u8>, Infallible>(None),
    ///     |event: &RetryEvent<'_, Option<u8>, _>| {
    ///         assert!(matches!(event.cause, RetryCause::Value(None)));
    ///         seen.push((event.attempt, event.will_retry));
    ///     },
    /// );
    ///
    /// assert!(result.unwrap_err().is_exhausted());
    /// assert_eq!(seen, vec![(1, true), (2, false)]);
    /// ```
    pub fn execute_with_hooks<E, F, H>(
        &self,
        mut op: F,
        mut on_retry: H,
    ) -> Result<T, RetryError<E>>
    where
        E: Kinded<Kind = K>,
        F: FnMut() -> Result<T, E>,
        H: FnMut(&RetryEvent<'_, T, E>),
    {
        let mut state = AttemptState::new();

        while state.has_attempts_left(self.max_attempts()) {
            let outcome = self.classify(op());
            if let ControlFlow::Break(result) =
                state.step(outcome, self.max_attempts(), &mut on_retry)
            {
                return result;
            }
        }

        Err(state.into_exhausted())
    }

    /// Like [`execute`](Self::execute), but returns the operation's own error
    /// type.
    ///
    /// Fatal and retryable errors come back exactly as the operation raised
    /// them; exhaustion on disallowed values is converted with
    /// `From<AttemptsExhausted>`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reprise::{AttemptsExhausted, Kinded, RetryPolicy};
    ///
    /// #[derive(Debug, PartialEq)]
    /// enum JobError {
    ///     Busy,
    ///     NoTriesRemaining,
    /// }
    ///
    /// impl Kinded for JobError {
    ///     type Kind = std::mem::Discriminant<JobError>;
    ///     fn kind(&self) -> Self::Kind {
    ///         std::mem::discriminant(self)
    ///     }
    /// }
    ///
    /// impl From<AttemptsExhausted> for JobError {
    ///     fn from(_: AttemptsExhausted) -> Self {
    ///         JobError::NoTriesRemaining
    ///     }
    /// }
    ///
    /// let policy = RetryPolicy::<u32, _>::new()
    ///     .with_retryable_val(0)
    ///     .with_retryable_kind(std::mem::discriminant(&JobError::Busy))
    ///     .with_max_attempts(3);
    ///
    /// assert_eq!(policy.run(|| Err(JobError::Busy)), Err(JobError::Busy));
    /// assert_eq!(policy.run(|| Ok::<_, JobError>(0)), Err(JobError::NoTriesRemaining));
    /// ```
    pub fn run<E, F>(&self, op: F) -> Result<T, E>
    where
        E: Kinded<Kind = K> + From<AttemptsExhausted>,
        F: FnMut() -> Result<T, E>,
    {
        self.execute(op).map_err(RetryError::flatten)
    }

    /// Bind this policy to an operation, producing a reusable wrapper.
    ///
    /// Each [`Retrying::call`] gets a fresh attempt budget. Operations taking
    /// several arguments receive them as a tuple.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reprise::RetryPolicy;
    /// use std::io;
    ///
    /// let mut checked_div = RetryPolicy::<i32, io::ErrorKind>::new()
    ///     .with_max_attempts(2)
    ///     .wrap(|(a, b): (i32, i32)| {
    ///         a.checked_div(b)
    ///             .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "division by zero"))
    ///     });
    ///
    /// assert_eq!(checked_div.call((10, 2)).unwrap(), 5);
    /// assert!(checked_div.call((1, 0)).unwrap_err().is_non_retryable());
    /// ```
    pub fn wrap<F>(self, op: F) -> Retrying<F, T, K> {
        Retrying { op, policy: self }
    }
}

/// An operation bound to a [`RetryPolicy`].
///
/// Created by [`RetryPolicy::wrap`].
pub struct Retrying<F, T, K> {
    op: F,
    policy: RetryPolicy<T, K>,
}

impl<F, T, K> Retrying<F, T, K> {
    /// Get the policy applied on every call.
    pub fn policy(&self) -> &RetryPolicy<T, K> {
        &self.policy
    }

    /// Unbind the operation, discarding the policy.
    pub fn into_inner(self) -> F {
        self.op
    }
}

impl<F, T: PartialEq, K: PartialEq> Retrying<F, T, K> {
    /// Call the wrapped operation with `args` under the bound policy.
    ///
    /// Every attempt receives its own clone of `args`.
    pub fn call<A, E>(&mut self, args: A) -> Result<T, RetryError<E>>
    where
        A: Clone,
        E: Kinded<Kind = K>,
        F: FnMut(A) -> Result<T, E>,
    {
        let op = &mut self.op;
        self.policy.execute(|| op(args.clone()))
    }
}

impl<F, T: fmt::Debug, K: fmt::Debug> fmt::Debug for Retrying<F, T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrying")
            .field("op", &"<op>")
            .field("policy", &self.policy)
            .finish()
    }
}

/// Run `op` under `policy`.
///
/// Shorthand for [`RetryPolicy::execute`].
///
/// # Examples
///
/// ```rust
/// use reprise::{retry, RetryPolicy};
///
/// let policy = RetryPolicy::<_, std::io::ErrorKind>::new().with_retryable_val(-1);
/// let result: Result<i32, _> = retry(|| Ok::<_, std::io::Error>(4), &policy);
/// assert_eq!(result.unwrap(), 4);
/// ```
pub fn retry<T, K, E, F>(op: F, policy: &RetryPolicy<T, K>) -> Result<T, RetryError<E>>
where
    T: PartialEq,
    K: PartialEq,
    E: Kinded<Kind = K>,
    F: FnMut() -> Result<T, E>,
{
    policy.execute(op)
}
