//! Tagged result for operations that may degrade instead of failing.
//!
//! Storage outages inside the creation pipeline relax policy strictness
//! rather than block delivery. [`Outcome`] makes that visible: a caller
//! can tell a clean answer from a fallback default and from a hard failure.

use crate::error::AppError;

/// Result of a degradable operation.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    /// The operation completed against its backing store.
    Ok(T),
    /// The backing store failed; `value` is a safe default.
    Degraded {
        /// Fallback value used in place of the real answer.
        value: T,
        /// Why the operation degraded.
        reason: String,
    },
    /// The operation failed and no safe default exists.
    Failed(AppError),
}

impl<T> Outcome<T> {
    /// Build a degraded outcome from an error and a fallback value.
    pub fn degraded(value: T, err: &AppError) -> Self {
        Self::Degraded {
            value,
            reason: err.to_string(),
        }
    }

    /// Whether the value came from a fallback default.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    /// Whether the operation failed outright.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Degradation reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Degraded { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// The value, whether clean or degraded.
    pub fn value(self) -> Option<T> {
        match self {
            Self::Ok(v) | Self::Degraded { value: v, .. } => Some(v),
            Self::Failed(_) => None,
        }
    }

    /// Convert into a plain `Result`, treating degraded values as success.
    pub fn into_result(self) -> Result<T, AppError> {
        match self {
            Self::Ok(v) | Self::Degraded { value: v, .. } => Ok(v),
            Self::Failed(e) => Err(e),
        }
    }

    /// Fail open: turn a store result into `Ok`, or `Degraded` with `fallback`.
    pub fn fail_open(result: Result<T, AppError>, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(v) => Self::Ok(v),
            Err(e) => Self::degraded(fallback(), &e),
        }
    }
}
