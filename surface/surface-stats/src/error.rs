//! Failure type shared by every statistics primitive.

use std::fmt;

use thiserror::Error;

/// Result type for statistics primitives.
pub type StatResult<T> = Result<T, StatisticsFailure>;

/// Category of a primitive failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Shape mismatch, empty data or an illegal parameter.
    InvalidInput,
    /// Numerical degeneracy: singular systems, zero variance where a ratio
    /// is required, or an output of unexpected shape.
    ConvergenceFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput => f.write_str("invalid input"),
            Self::ConvergenceFailure => f.write_str("convergence failure"),
        }
    }
}

/// Typed failure reported by a statistics primitive.
///
/// Primitives never return sentinel values on failure; enclosing map
/// kernels wrap this into their own error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct StatisticsFailure {
    /// Failure category.
    pub kind: FailureKind,
    /// Human-readable description.
    pub message: String,
}

impl StatisticsFailure {
    /// Create an [`FailureKind::InvalidInput`] failure.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::InvalidInput,
            message: message.into(),
        }
    }

    /// Create a [`FailureKind::ConvergenceFailure`] failure.
    pub fn convergence(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::ConvergenceFailure,
            message: message.into(),
        }
    }
}
