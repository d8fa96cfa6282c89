//! Retry Patterns Example
//!
//! Demonstrates the ways of retrying a fallible operation:
//! - Retrying on retryable error kinds
//! - Retrying on disallowed return values
//! - Observing attempts through hooks
//! - Binding a policy to an operation with `wrap`
//! - Flattening retry errors into the operation's own error type
//!
//! Run with: cargo run --example retry_patterns

use std::cell::Cell;
use std::fmt;

use reprise::prelude::*;
use reprise::{RetryCause, RetryEvent};

#[derive(Debug, Clone, PartialEq)]
enum HttpError {
    ServerError(u16),
    ClientError(u16),
    Timeout,
    RetriesExhausted,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::ServerError(code) => write!(f, "server error {}", code),
            HttpError::ClientError(code) => write!(f, "client error {}", code),
            HttpError::Timeout => write!(f, "request timed out"),
            HttpError::RetriesExhausted => write!(f, "no retries left"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum HttpErrorKind {
    Server,
    Client,
    Timeout,
    Exhausted,
}

impl Kinded for HttpError {
    type Kind = HttpErrorKind;

    fn kind(&self) -> HttpErrorKind {
        match self {
            HttpError::ServerError(_) => HttpErrorKind::Server,
            HttpError::ClientError(_) => HttpErrorKind::Client,
            HttpError::Timeout => HttpErrorKind::Timeout,
            HttpError::RetriesExhausted => HttpErrorKind::Exhausted,
        }
    }
}

impl From<AttemptsExhausted> for HttpError {
    fn from(_: AttemptsExhausted) -> Self {
        HttpError::RetriesExhausted
    }
}

fn transient_policy<T: PartialEq>() -> RetryPolicy<T, HttpErrorKind> {
    RetryPolicy::new()
        .with_retryable_kinds([HttpErrorKind::Server, HttpErrorKind::Timeout])
        .with_max_attempts(4)
}

// ==================== Retryable Errors ====================

/// Example 1: Retry transient failures until the operation recovers
fn example_retryable_errors() {
    println!("\n=== Example 1: Retryable Errors ===");

    let attempts = Cell::new(0);
    let result = transient_policy().execute(|| {
        attempts.set(attempts.get() + 1);
        println!("  Attempt {}", attempts.get());
        match attempts.get() {
            1 => Err(HttpError::Timeout),
            2 => Err(HttpError::ServerError(503)),
            _ => Ok("200 OK"),
        }
    });

    match result {
        Ok(body) => println!("Success after {} attempts: {}", attempts.get(), body),
        Err(e) => println!("Failed: {}", e),
    }
}

// ==================== Fatal Errors ====================

/// Example 2: Errors outside the retryable kinds stop at once
fn example_fatal_error() {
    println!("\n=== Example 2: Fatal Errors ===");

    let attempts = Cell::new(0);
    let result = transient_policy::<&str>().execute(|| {
        attempts.set(attempts.get() + 1);
        Err(HttpError::ClientError(404))
    });

    match result {
        Err(RetryError::NonRetryable(e)) => {
            println!("Gave up after {} attempt: {}", attempts.get(), e)
        }
        other => println!("Unexpected: {:?}", other),
    }
}

// ==================== Disallowed Values ====================

/// Example 3: Poll until the operation stops returning a placeholder
fn example_disallowed_values() {
    println!("\n=== Example 3: Disallowed Values ===");

    let polls = Cell::new(0);
    let policy = transient_policy()
        .with_retryable_vals(["pending", "queued"])
        .with_max_attempts(5);

    let result = policy.execute(|| {
        polls.set(polls.get() + 1);
        let status = match polls.get() {
            1 => "queued",
            2 | 3 => "pending",
            _ => "finished",
        };
        println!("  Poll {}: {}", polls.get(), status);
        Ok::<_, HttpError>(status)
    });

    println!("Final status: {:?}", result);

    let never_done = policy.execute(|| Ok::<_, HttpError>("pending"));
    println!("Never finishes: {:?}", never_done);
}

// ==================== Hooks ====================

/// Example 4: Observe every failed attempt
fn example_hooks() {
    println!("\n=== Example 4: Retry Hooks ===");

    let attempts = Cell::new(0);
    let result = transient_policy::<u16>().execute_with_hooks(
        || {
            attempts.set(attempts.get() + 1);
            Err(HttpError::ServerError(500 + attempts.get()))
        },
        |event: &RetryEvent<'_, u16, HttpError>| {
            let cause = match event.cause {
                RetryCause::Value(v) => format!("value {}", v),
                RetryCause::Error(e) => e.to_string(),
            };
            println!(
                "  [{}/{}] {} (will retry: {})",
                event.attempt, event.max_attempts, cause, event.will_retry
            );
        },
    );

    if let Err(e) = result {
        println!("Last error: {}", e);
    }
}

// ==================== Wrapped Operations ====================

/// Example 5: Bind a policy to an operation and call it repeatedly
fn example_wrap() {
    println!("\n=== Example 5: Wrapped Operations ===");

    let flaky = Cell::new(true);
    let mut fetch = transient_policy().wrap(|(path, page): (&str, u32)| {
        if flaky.replace(!flaky.get()) {
            Err(HttpError::Timeout)
        } else {
            Ok(format!("{}?page={}", path, page))
        }
    });

    for page in 1..=3 {
        match fetch.call(("/items", page)) {
            Ok(url) => println!("  Fetched {}", url),
            Err(e) => println!("  Failed page {}: {}", page, e),
        }
    }
    println!("Policy: {:?}", fetch.policy());
}

// ==================== Flattened Errors ====================

/// Example 6: Keep the operation's own error type at the call site
fn example_run() -> Result<u32, HttpError> {
    println!("\n=== Example 6: Flattened Errors ===");

    let policy = transient_policy().with_retryable_val(0u32).with_max_attempts(2);

    match policy.run(|| Ok::<_, HttpError>(0)) {
        Err(HttpError::RetriesExhausted) => println!("Exhausted on empty results"),
        other => println!("Unexpected: {:?}", other),
    }

    let count = policy.run(|| Ok::<_, HttpError>(12))?;
    println!("Item count: {}", count);
    Ok(count)
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    println!("======================================");
    println!("       Retry Patterns Example         ");
    println!("======================================");

    example_retryable_errors();
    example_fatal_error();
    example_disallowed_values();
    example_hooks();
    example_wrap();
    if let Err(e) = example_run() {
        println!("Example 6 failed: {}", e);
    }

    println!("\n======================================");
    println!("           Examples Complete           ");
    println!("======================================");
}
