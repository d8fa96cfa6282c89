//! # Reprise
//!
//! Bounded retry for fallible operations.
//!
//! An operation fails either by returning a value you have declared
//! unacceptable, or by returning an error whose kind you have declared
//! retryable. A [`RetryPolicy`] re-invokes it on those failures, up to a fixed
//! number of attempts, and lets every other error through on first sight.
//!
//! ## Quick Example
//!
//! ```rust
//! use reprise::{Kinded, RetryError, RetryPolicy};
//!
//! #[derive(Debug, PartialEq)]
//! enum ApiError {
//!     RateLimited,
//!     Unauthorized,
//! }
//!
//! impl Kinded for ApiError {
//!     type Kind = std::mem::Discriminant<ApiError>;
//!     fn kind(&self) -> Self::Kind {
//!         std::mem::discriminant(self)
//!     }
//! }
//!
//! let policy = RetryPolicy::<String, _>::new()
//!     .with_retryable_kind(std::mem::discriminant(&ApiError::RateLimited))
//!     .with_max_attempts(3);
//!
//! let mut responses = vec![Ok("rows".to_string()), Err(ApiError::RateLimited)];
//! let result = policy.execute(|| responses.pop().unwrap_or(Err(ApiError::Unauthorized)));
//! assert_eq!(result, Ok("rows".to_string()));
//!
//! let result = policy.execute(|| Err::<String, _>(ApiError::Unauthorized));
//! assert_eq!(result, Err(RetryError::NonRetryable(ApiError::Unauthorized)));
//! ```
//!
//! The [`sheets`] module describes a spreadsheet service as a set of traits so
//! its calls can be wrapped the same way; [`testing`] provides scripted
//! operations and an in-memory workbook.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod retry;
pub mod sheets;
pub mod testing;

// Re-exports
pub use retry::{
    retry, AttemptsExhausted, Kinded, Outcome, PolicyError, RetryCause, RetryConfig, RetryError,
    RetryEvent, RetryPolicy, Retrying,
};
pub use sheets::{ExportFormat, SheetError, SheetSelector};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::retry::{AttemptsExhausted, Kinded, RetryError, RetryPolicy, Retrying};
    pub use crate::sheets::{SheetsClient, Workbook, Worksheet};
}
