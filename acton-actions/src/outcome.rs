//! Tagged success/failure outcomes
//!
//! [`Outcome`] is what operations and record mutations hand back to the
//! action layer. Exactly one branch is populated, and consumers fold it with
//! [`Outcome::either`] or an exhaustive `match`.
//!
//! # Example
//!
//! ```rust
//! use acton_actions::outcome::Outcome;
//!
//! let outcome: Outcome<u32, String> = Outcome::Success(7);
//! let rendered = outcome.either(|n| format!("got {n}"), |e| format!("failed: {e}"));
//! assert_eq!(rendered, "got 7");
//! ```

/// Success or failure of an operation or mutation
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T, E> {
    /// The unit of work succeeded
    Success(T),
    /// The unit of work failed
    Failure(E),
}

impl<T, E> Outcome<T, E> {
    /// Returns `true` for the success branch
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` for the failure branch
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Fold the outcome into a single value
    pub fn either<R>(self, on_success: impl FnOnce(T) -> R, on_failure: impl FnOnce(E) -> R) -> R {
        match self {
            Self::Success(value) => on_success(value),
            Self::Failure(error) => on_failure(error),
        }
    }

    /// Transform the success value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U, E> {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Transform the failure value
    pub fn map_failure<F>(self, f: impl FnOnce(E) -> F) -> Outcome<T, F> {
        match self {
            Self::Success(value) => Outcome::Success(value),
            Self::Failure(error) => Outcome::Failure(f(error)),
        }
    }

    /// The success value, if any
    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Failure(_) => None,
        }
    }

    /// The failure value, if any
    pub fn failure(self) -> Option<E> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Convert into a standard `Result`
    pub fn into_result(self) -> Result<T, E> {
        self.into()
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Failure(error),
        }
    }
}

impl<T, E> From<Outcome<T, E>> for Result<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        match outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_either_picks_the_populated_branch() {
        let ok: Outcome<i32, &str> = Outcome::Success(2);
        let err: Outcome<i32, &str> = Outcome::Failure("boom");

        assert_eq!(ok.either(|v| v * 10, |_| -1), 20);
        assert_eq!(err.either(|v| v * 10, |e| e.len() as i32), 4);
    }

    #[test]
    fn test_predicates() {
        let ok: Outcome<(), ()> = Outcome::Success(());
        assert!(ok.is_success());
        assert!(!ok.is_failure());

        let err: Outcome<(), ()> = Outcome::Failure(());
        assert!(err.is_failure());
    }

    #[test]
    fn test_map_and_map_failure() {
        let ok: Outcome<i32, String> = Outcome::Success(3);
        assert_eq!(ok.map(|v| v + 1), Outcome::Success(4));

        let err: Outcome<i32, String> = Outcome::Failure("bad".to_string());
        assert_eq!(err.map_failure(|e| e.len()), Outcome::Failure(3));
    }

    #[test]
    fn test_result_conversions() {
        let outcome: Outcome<i32, String> = Ok(1).into();
        assert_eq!(outcome.clone().success(), Some(1));
        assert_eq!(outcome.into_result(), Ok(1));

        let outcome: Outcome<i32, String> = Err("nope".to_string()).into();
        assert_eq!(outcome.failure(), Some("nope".to_string()));
    }
}
