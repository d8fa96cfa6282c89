//! Bounded retry of fallible operations.
//!
//! This module follows the "pure core, imperative shell" split:
//!
//! - **Pure Core**: [`RetryPolicy`] is just data, and [`RetryPolicy::classify`]
//!   maps one invocation's result to an [`Outcome`] without side effects
//! - **Imperative Shell**: [`RetryPolicy::execute`] runs the operation and loops
//!   on the classified outcomes
//!
//! # Quick Start
//!
//! ```rust
//! use reprise::{RetryError, RetryPolicy};
//! use std::cell::Cell;
//! use std::io;
//!
//! let calls = Cell::new(0);
//! let policy = RetryPolicy::new()
//!     .with_retryable_val(None)
//!     .with_retryable_kind(io::ErrorKind::TimedOut)
//!     .with_max_attempts(3);
//!
//! // Always returns a disallowed value: 3 attempts, then exhaustion.
//! let result = policy.execute(|| {
//!     calls.set(calls.get() + 1);
//!     Ok::<Option<u32>, io::Error>(None)
//! });
//!
//! assert_eq!(calls.get(), 3);
//! assert!(matches!(result, Err(RetryError::AttemptsExhausted)));
//! ```
//!
//! # What counts as a failure
//!
//! - A returned value listed in the policy's retryable values
//! - An error whose [`Kinded::kind`] is listed in the policy's retryable kinds
//!
//! Any other error is fatal: it is returned as [`RetryError::NonRetryable`]
//! after a single call, whatever the remaining budget.
//!
//! # Exhaustion
//!
//! When the budget runs out, the most recent retryable error is returned as
//! [`RetryError::Retryable`]. The recorded error is sticky: if a later attempt
//! failed by returning a disallowed value instead, the earlier error is still
//! the one returned. Only when no retryable error was ever caught does the
//! executor return [`RetryError::AttemptsExhausted`].
//!
//! # Error Types
//!
//! - [`RetryError`]: Returned when the loop ends without an acceptable value
//! - [`AttemptsExhausted`]: Payload-free marker for exhaustion on values
//! - [`PolicyError`]: Returned when a policy or config is unusable

mod config;
mod error;
mod executor;
#[cfg(feature = "async")]
mod future;
mod kind;
mod policy;

pub use config::RetryConfig;
pub use error::{AttemptsExhausted, PolicyError, RetryError};
pub use executor::{retry, Retrying};
pub use kind::Kinded;
pub use policy::{Outcome, RetryCause, RetryEvent, RetryPolicy, DEFAULT_MAX_ATTEMPTS};

#[cfg(test)]
mod tests;
