//! Error-kind tags used to decide whether an error is retryable.

/// An error that can report which kind of failure it represents.
///
/// A [`RetryPolicy`](crate::RetryPolicy) holds a list of kinds it is willing to
/// retry. An error is retryable when its `kind()` compares equal to one of them;
/// every other error propagates on first occurrence.
///
/// For enum errors the simplest kind is a fieldless mirror enum, or
/// [`std::mem::Discriminant`] when the variants carry data you don't want to
/// compare.
///
/// # Examples
///
/// ```rust
/// use reprise::{Kinded, RetryPolicy};
///
/// #[derive(Debug, PartialEq)]
/// enum FetchError {
///     Timeout(u64),
///     NotFound(String),
/// }
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum FetchErrorKind {
///     Timeout,
///     NotFound,
/// }
///
/// impl Kinded for FetchError {
///     type Kind = FetchErrorKind;
///
///     fn kind(&self) -> FetchErrorKind {
///         match self {
///             FetchError::Timeout(_) => FetchErrorKind::Timeout,
///             FetchError::NotFound(_) => FetchErrorKind::NotFound,
///         }
///     }
/// }
///
/// let policy = RetryPolicy::<(), _>::new().with_retryable_kind(FetchErrorKind::Timeout);
///
/// assert!(policy.is_retryable_error(&FetchError::Timeout(30)));
/// assert!(!policy.is_retryable_error(&FetchError::NotFound("/a".into())));
/// ```
pub trait Kinded {
    /// The tag compared against a policy's retryable kinds.
    type Kind: PartialEq;

    /// Report the kind of this error.
    fn kind(&self) -> Self::Kind;
}

impl Kinded for std::io::Error {
    type Kind = std::io::ErrorKind;

    fn kind(&self) -> std::io::ErrorKind {
        std::io::Error::kind(self)
    }
}

/// Lets value-only policies wrap operations that cannot fail.
impl Kinded for std::convert::Infallible {
    type Kind = std::convert::Infallible;

    fn kind(&self) -> std::convert::Infallible {
        match *self {}
    }
}

impl<K: Kinded + ?Sized> Kinded for Box<K> {
    type Kind = K::Kind;

    fn kind(&self) -> K::Kind {
        (**self).kind()
    }
}

#[cfg(test)]
mod kind_tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error_kind() {
        let err = io::Error::new(io::ErrorKind::TimedOut, "slow peer");
        assert_eq!(Kinded::kind(&err), io::ErrorKind::TimedOut);
    }

    #[test]
    fn test_boxed_kind_delegates() {
        let err = Box::new(io::Error::from(io::ErrorKind::Interrupted));
        assert_eq!(Kinded::kind(&err), io::ErrorKind::Interrupted);
    }
}
