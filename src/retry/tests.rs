//! Integration tests for retry functionality.

use super::*;
use crate::testing::{ScriptedOp, Step};
use std::cell::Cell;

#[derive(Debug, Clone, PartialEq)]
enum TestError {
    Value(u32),
    Index(u32),
    Name(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TestKind {
    Value,
    Index,
    Name,
}

impl Kinded for TestError {
    type Kind = TestKind;

    fn kind(&self) -> TestKind {
        match self {
            TestError::Value(_) => TestKind::Value,
            TestError::Index(_) => TestKind::Index,
            TestError::Name(_) => TestKind::Name,
        }
    }
}

fn policy(max_attempts: u32) -> RetryPolicy<i32, TestKind> {
    RetryPolicy::new().with_max_attempts(max_attempts)
}

#[test]
fn test_no_retry_passes_args_and_returns_value() {
    let op = ScriptedOp::<i32, TestError, (i32, i32)>::recording(vec![Step::Return(1)]);

    let mut wrapped = RetryPolicy::new()
        .with_retryable_val(-1)
        .wrap(|args: (i32, i32)| op.call_with(args));

    let result = wrapped.call((1, 2));

    assert_eq!(result, Ok(1));
    assert_eq!(op.calls(), 1);
    assert_eq!(op.recorded_args(), vec![(1, 2)]);
}

#[test]
fn test_retry_due_to_bad_return() {
    let op = ScriptedOp::<i32, TestError>::always(Step::Return(1));

    let result = policy(3).with_retryable_val(1).execute(|| op.call());

    assert_eq!(result, Err(RetryError::AttemptsExhausted));
    assert_eq!(op.calls(), 3);
}

#[test]
fn test_retry_due_to_retryable_error_reraises_final_error() {
    let op = ScriptedOp::<i32, _>::new(vec![
        Step::Fail(TestError::Value(1)),
        Step::Fail(TestError::Value(2)),
        Step::Fail(TestError::Value(3)),
    ]);

    let result = policy(3)
        .with_retryable_kinds([TestKind::Value, TestKind::Index])
        .execute(|| op.call());

    assert_eq!(result, Err(RetryError::Retryable(TestError::Value(3))));
    assert_eq!(op.calls(), 3);
}

#[test]
fn test_retry_due_to_retryable_error_and_recovers() {
    let op = ScriptedOp::new(vec![
        Step::Fail(TestError::Value(1)),
        Step::Fail(TestError::Index(2)),
        Step::Return(1),
    ]);

    let result = policy(3)
        .with_retryable_kinds([TestKind::Value, TestKind::Index])
        .execute(|| op.call());

    assert_eq!(result, Ok(1));
    assert_eq!(op.calls(), 3);
}

#[test]
fn test_raises_non_retryable_errors() {
    let op = ScriptedOp::<i32, _>::always(Step::Fail(TestError::Name(1)));

    let result = policy(3)
        .with_retryable_kinds([TestKind::Value, TestKind::Index])
        .execute(|| op.call());

    assert_eq!(result, Err(RetryError::NonRetryable(TestError::Name(1))));
    assert_eq!(op.calls(), 1);
}

#[test]
fn test_non_retryable_error_after_retryable_ones_aborts() {
    let op = ScriptedOp::<i32, _>::new(vec![
        Step::Fail(TestError::Value(1)),
        Step::Fail(TestError::Name(2)),
        Step::Return(0),
    ]);

    let result = policy(5)
        .with_retryable_kind(TestKind::Value)
        .execute(|| op.call());

    assert_eq!(result, Err(RetryError::NonRetryable(TestError::Name(2))));
    assert_eq!(op.calls(), 2);
}

#[test]
fn test_empty_policy_runs_once() {
    let ok = ScriptedOp::<i32, TestError>::always(Step::Return(0));
    assert_eq!(policy(4).execute(|| ok.call()), Ok(0));
    assert_eq!(ok.calls(), 1);

    let err = ScriptedOp::<i32, _>::always(Step::Fail(TestError::Value(9)));
    assert_eq!(
        policy(4).execute(|| err.call()),
        Err(RetryError::NonRetryable(TestError::Value(9)))
    );
    assert_eq!(err.calls(), 1);
}

#[test]
fn test_value_outside_retryable_set_returns_at_once() {
    let op = ScriptedOp::<i32, TestError>::always(Step::Return(7));

    let result = policy(3).with_retryable_vals([0, 1]).execute(|| op.call());

    assert_eq!(result, Ok(7));
    assert_eq!(op.calls(), 1);
}

#[test]
fn test_retryable_values_then_success() {
    let op = ScriptedOp::<i32, TestError>::new(vec![
        Step::Return(0),
        Step::Return(0),
        Step::Return(5),
    ]);

    let result = policy(5).with_retryable_val(0).execute(|| op.call());

    assert_eq!(result, Ok(5));
    assert_eq!(op.calls(), 3);
}

#[test]
fn test_last_retryable_error_is_sticky_over_bad_values() {
    let op = ScriptedOp::new(vec![
        Step::Return(0),
        Step::Fail(TestError::Index(2)),
        Step::Return(0),
    ]);

    let result = policy(3)
        .with_retryable_val(0)
        .with_retryable_kind(TestKind::Index)
        .execute(|| op.call());

    assert_eq!(result, Err(RetryError::Retryable(TestError::Index(2))));
    assert_eq!(op.calls(), 3);
}

#[test]
fn test_most_recent_retryable_error_wins() {
    let op = ScriptedOp::new(vec![
        Step::Fail(TestError::Value(1)),
        Step::Fail(TestError::Index(2)),
        Step::Return(0),
        Step::Return(0),
    ]);

    let result = policy(4)
        .with_retryable_val(0)
        .with_retryable_kinds([TestKind::Value, TestKind::Index])
        .execute(|| op.call());

    assert_eq!(result, Err(RetryError::Retryable(TestError::Index(2))));
}

#[test]
fn test_single_attempt_policy() {
    let op = ScriptedOp::<i32, _>::always(Step::Fail(TestError::Value(1)));

    let result = policy(1)
        .with_retryable_kind(TestKind::Value)
        .execute(|| op.call());

    assert_eq!(result, Err(RetryError::Retryable(TestError::Value(1))));
    assert_eq!(op.calls(), 1);
}

#[test]
fn test_zero_attempts_never_invokes() {
    let calls = Cell::new(0);

    let result = policy(0).execute(|| {
        calls.set(calls.get() + 1);
        Ok::<_, TestError>(1)
    });

    assert_eq!(result, Err(RetryError::AttemptsExhausted));
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_wrapped_calls_get_fresh_budgets() {
    let op = ScriptedOp::<i32, _>::new(vec![
        Step::Fail(TestError::Value(1)),
        Step::Fail(TestError::Value(2)),
        Step::Return(10),
        Step::Fail(TestError::Value(3)),
        Step::Return(20),
    ]);

    let mut wrapped = policy(3)
        .with_retryable_kind(TestKind::Value)
        .wrap(|()| op.call());

    assert_eq!(wrapped.call(()), Ok(10));
    assert_eq!(wrapped.call(()), Ok(20));
    assert_eq!(op.calls(), 5);
}

#[test]
fn test_wrapped_policy_is_exposed() {
    let wrapped = policy(2).with_retryable_val(3).wrap(|x: i32| Ok::<_, TestError>(x));
    assert_eq!(wrapped.policy().max_attempts(), 2);
    assert_eq!(wrapped.policy().retryable_vals(), &[3]);
    assert!(format!("{:?}", wrapped).contains("Retrying"));

    let op = wrapped.into_inner();
    assert_eq!(op(5), Ok(5));
}

#[test]
fn test_run_flattens_to_operation_error() {
    #[derive(Debug, PartialEq)]
    enum JobError {
        Busy(u32),
        NoTriesRemaining,
    }

    impl Kinded for JobError {
        type Kind = std::mem::Discriminant<JobError>;

        fn kind(&self) -> Self::Kind {
            std::mem::discriminant(self)
        }
    }

    impl From<AttemptsExhausted> for JobError {
        fn from(_: AttemptsExhausted) -> Self {
            JobError::NoTriesRemaining
        }
    }

    let busy = std::mem::discriminant(&JobError::Busy(0));
    let attempt = Cell::new(0);
    let policy = RetryPolicy::<&str, _>::new()
        .with_retryable_val("pending")
        .with_retryable_kind(busy)
        .with_max_attempts(2);

    let result = policy.run(|| {
        attempt.set(attempt.get() + 1);
        Err(JobError::Busy(attempt.get()))
    });
    assert_eq!(result, Err(JobError::Busy(2)));

    assert_eq!(
        policy.run(|| Ok::<_, JobError>("pending")),
        Err(JobError::NoTriesRemaining)
    );
    assert_eq!(policy.run(|| Ok::<_, JobError>("done")), Ok("done"));
}

#[test]
fn test_hooks_see_every_retryable_attempt() {
    let op = ScriptedOp::new(vec![
        Step::Fail(TestError::Value(1)),
        Step::Return(0),
        Step::Return(0),
    ]);
    let mut events = Vec::new();

    let result = policy(3)
        .with_retryable_val(0)
        .with_retryable_kind(TestKind::Value)
        .execute_with_hooks(
            || op.call(),
            |event: &RetryEvent<'_, i32, TestError>| {
                let cause = match event.cause {
                    RetryCause::Value(v) => format!("value {}", v),
                    RetryCause::Error(e) => format!("error {:?}", e),
                };
                events.push((event.attempt, event.max_attempts, cause, event.will_retry));
            },
        );

    assert_eq!(result, Err(RetryError::Retryable(TestError::Value(1))));
    assert_eq!(
        events,
        vec![
            (1, 3, "error Value(1)".to_string(), true),
            (2, 3, "value 0".to_string(), true),
            (3, 3, "value 0".to_string(), false),
        ]
    );
}

#[test]
fn test_hooks_not_called_on_success_or_fatal() {
    let hook_calls = Cell::new(0);
    let hook = |_: &RetryEvent<'_, i32, TestError>| hook_calls.set(hook_calls.get() + 1);

    let policy = policy(3).with_retryable_kind(TestKind::Value);
    assert_eq!(policy.execute_with_hooks(|| Ok(1), hook), Ok(1));
    assert_eq!(
        policy.execute_with_hooks(|| Err(TestError::Name(0)), hook),
        Err(RetryError::NonRetryable(TestError::Name(0)))
    );

    assert_eq!(hook_calls.get(), 0);
}

#[test]
fn test_retry_free_function() {
    let op = ScriptedOp::new(vec![Step::Fail(TestError::Index(0)), Step::Return(3)]);
    let policy = policy(2).with_retryable_kind(TestKind::Index);

    assert_eq!(retry(|| op.call(), &policy), Ok(3));
}

#[test]
fn test_io_errors_retry_by_kind() {
    use std::io;

    let attempts = Cell::new(0);
    let policy = RetryPolicy::<(), _>::new()
        .with_retryable_kind(io::ErrorKind::Interrupted)
        .with_max_attempts(3);

    let result = policy.execute(|| {
        attempts.set(attempts.get() + 1);
        if attempts.get() == 1 {
            Err(io::Error::new(io::ErrorKind::Interrupted, "signal"))
        } else {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    });

    let err = result.unwrap_err();
    assert!(err.is_non_retryable());
    assert_eq!(err.into_inner().map(|e| e.kind()), Some(io::ErrorKind::PermissionDenied));
    assert_eq!(attempts.get(), 2);
}
