//! Error types for conundrum.
//!
//! Every fallible operation in the workspace returns [`Result`], whose error
//! side is the single `thiserror`-derived [`Error`] enum below.  Precondition
//! checks go through the [`ensure!`](crate::ensure) and [`fail!`](crate::fail)
//! macros so the offending value always ends up in the message.

use thiserror::Error;

/// The top-level error type used throughout conundrum.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error.
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated: bad input, wrong coupon kind, empty handle.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// An operation was requested through an empty handle.
    #[error("null value: {0}")]
    NullValue(String),

    /// Date-related error.
    #[error("date error: {0}")]
    Date(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not supported by this object.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// A fixing in the past or on the evaluation date was required but none
    /// is stored and none can be forecast.
    #[error("missing {index} fixing for {date}")]
    MissingFixing {
        /// Name of the index.
        index: String,
        /// The fixing date, formatted.
        date: String,
    },

    /// An iterative routine exhausted its evaluation budget or could not
    /// bracket a solution.
    #[error(
        "{method} failed to converge after {evaluations} evaluations \
         (last estimate {last_estimate:e}){}",
        context_suffix(.context)
    )]
    Convergence {
        /// Name of the routine (`"brent"`, `"newton_safe"`, ...).
        method: &'static str,
        /// Number of function evaluations performed.
        evaluations: usize,
        /// Best estimate available when the routine gave up.
        last_estimate: f64,
        /// Market context appended by the caller, empty if none.
        context: String,
    },
}

fn context_suffix(context: &str) -> String {
    if context.is_empty() {
        String::new()
    } else {
        format!(": {context}")
    }
}

impl Error {
    /// Attach market context to a [`Error::Convergence`] failure.
    ///
    /// Other variants are returned unchanged.
    pub fn with_context(self, extra: impl Into<String>) -> Self {
        match self {
            Error::Convergence {
                method,
                evaluations,
                last_estimate,
                context,
            } => {
                let extra = extra.into();
                let context = if context.is_empty() {
                    extra
                } else {
                    format!("{context}; {extra}")
                };
                Error::Convergence {
                    method,
                    evaluations,
                    last_estimate,
                    context,
                }
            }
            other => other,
        }
    }

    /// `true` for numerical non-convergence.
    pub fn is_convergence(&self) -> bool {
        matches!(self, Error::Convergence { .. })
    }
}

/// Shorthand `Result` type used throughout conundrum.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::Precondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use conundrum_core::{ensure, errors::Error};
/// fn positive(x: f64) -> conundrum_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(matches!(positive(-1.0), Err(Error::Precondition(_))));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Precondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use conundrum_core::fail;
/// fn always_err() -> conundrum_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounded(x: f64) -> Result<f64> {
        ensure!(x <= 1.0, "x ({x}) above 1");
        ensure_post!(x >= 0.0, "x ({x}) below 0");
        Ok(x)
    }

    #[test]
    fn macros_map_to_variants() {
        assert!(matches!(bounded(2.0), Err(Error::Precondition(_))));
        assert!(matches!(bounded(-1.0), Err(Error::Postcondition(_))));
        assert_eq!(bounded(0.5), Ok(0.5));
    }

    #[test]
    fn convergence_context_is_appended() {
        let e = Error::Convergence {
            method: "brent",
            evaluations: 100,
            last_estimate: 0.25,
            context: String::new(),
        }
        .with_context("swap rate 0.03")
        .with_context("mean reversion 0.01");
        assert!(e.is_convergence());
        let msg = e.to_string();
        assert!(msg.contains("brent failed to converge after 100"), "{msg}");
        assert!(msg.ends_with(": swap rate 0.03; mean reversion 0.01"), "{msg}");
    }

    #[test]
    fn with_context_leaves_other_variants_alone() {
        let e = Error::Runtime("boom".into()).with_context("ignored");
        assert_eq!(e, Error::Runtime("boom".into()));
    }
}
