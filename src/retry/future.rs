//! Retry support for async operations.
//!
//! Same classification and exhaustion rules as the synchronous executor.
//! Attempts are awaited one after another; nothing is spawned and no delay is
//! inserted between attempts.

use std::future::Future;
use std::ops::ControlFlow;

use super::error::RetryError;
use super::executor::AttemptState;
use super::kind::Kinded;
use super::policy::{RetryEvent, RetryPolicy};

impl<T: PartialEq, K: PartialEq> RetryPolicy<T, K> {
    /// Retry an async operation using a factory function.
    ///
    /// Each attempt awaits a fresh future from `make_future`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use reprise::RetryPolicy;
    /// use std::sync::atomic::{AtomicU32, Ordering};
    ///
    /// # tokio_test::block_on(async {
    /// let calls = AtomicU32::new(0);
    /// let policy = RetryPolicy::<_, std::io::ErrorKind>::new()
    ///     .with_retryable_val(None)
    ///     .with_max_attempts(3);
    ///
    /// let result = policy
    ///     .execute_async(|| {
    ///         let calls = &calls;
    ///         async move {
    ///             let n = calls.fetch_add(1, Ordering::SeqCst);
    ///             Ok::<_, std::io::Error>(if n < 1 { None } else { Some(n) })
    ///         }
    ///     })
    ///     .await;
    ///
    /// assert_eq!(result.unwrap(), Some(1));
    /// # });
    /// ```
    pub async fn execute_async<E, F, Fut>(&self, make_future: F) -> Result<T, RetryError<E>>
    where
        E: Kinded<Kind = K>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_async_with_hooks(make_future, |_: &RetryEvent<'_, T, E>| {})
            .await
    }

    /// Retry an async operation with a hook for observability.
    ///
    /// The `on_retry` callback is synchronous and should not block; use it for
    /// logging or metrics.
    pub async fn execute_async_with_hooks<E, F, Fut, H>(
        &self,
        mut make_future: F,
        mut on_retry: H,
    ) -> Result<T, RetryError<E>>
    where
        E: Kinded<Kind = K>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        H: FnMut(&RetryEvent<'_, T, E>),
    {
        let mut state = AttemptState::new();

        while state.has_attempts_left(self.max_attempts()) {
            let outcome = self.classify(make_future().await);
            if let ControlFlow::Break(result) =
                state.step(outcome, self.max_attempts(), &mut on_retry)
            {
                return result;
            }
        }

        Err(state.into_exhausted())
    }
}

#[cfg(test)]
mod tests {
    use crate::{Kinded, RetryError, RetryPolicy};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug, PartialEq, Clone)]
    enum TestError {
        Transient,
        Permanent,
    }

    impl Kinded for TestError {
        type Kind = TestKind;

        fn kind(&self) -> TestKind {
            std::mem::discriminant(self)
        }
    }

    type TestKind = std::mem::Discriminant<TestError>;

    fn transient_policy(max_attempts: u32) -> RetryPolicy<&'static str, TestKind> {
        RetryPolicy::new()
            .with_retryable_kind(std::mem::discriminant(&TestError::Transient))
            .with_max_attempts(max_attempts)
    }

    #[tokio::test]
    async fn test_async_retry_succeeds_on_third_attempt() {
        let attempts = Arc::new(AtomicU32::new(0));

        let result = transient_policy(5)
            .execute_async(|| {
                let attempts = attempts.clone();
                async move {
                    let n = attempts.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(TestError::Transient)
                    } else {
                        Ok("success")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("success"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_async_permanent_error_is_not_retried() {
        let attempts = Arc::new(AtomicU32::new(0));

        let result = transient_policy(5)
            .execute_async(|| {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err::<&str, _>(TestError::Permanent)
                }
            })
            .await;

        assert_eq!(result, Err(RetryError::NonRetryable(TestError::Permanent)));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_async_exhaustion_reraises_last_error() {
        let attempts = Arc::new(AtomicU32::new(0));

        let result = transient_policy(3)
            .execute_async(|| {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err::<&str, _>(TestError::Transient)
                }
            })
            .await;

        assert_eq!(result, Err(RetryError::Retryable(TestError::Transient)));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_async_hook_counts_failed_attempts() {
        let attempts = Arc::new(AtomicU32::new(0));
        let hook_calls = Arc::new(AtomicU32::new(0));

        let result = transient_policy(4)
            .with_retryable_val("pending")
            .execute_async_with_hooks(
                || {
                    let attempts = attempts.clone();
                    async move {
                        match attempts.fetch_add(1, Ordering::SeqCst) {
                            0 => Err(TestError::Transient),
                            1 => Ok("pending"),
                            _ => Ok("ready"),
                        }
                    }
                },
                {
                    let hook_calls = hook_calls.clone();
                    move |_event: &crate::RetryEvent<'_, &str, TestError>| {
                        hook_calls.fetch_add(1, Ordering::SeqCst);
                    }
                },
            )
            .await;

        assert_eq!(result, Ok("ready"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(hook_calls.load(Ordering::SeqCst), 2);
    }
}
