//! Error types for statistical map kernels.

use surface_cluster::ClusterError;
use surface_metric::MetricError;
use surface_smooth::SmoothError;
use surface_stats::{FailureKind, StatisticsFailure};
use surface_types::{Cancelled, MeshError};
use thiserror::Error;

/// Result type for map kernels.
pub type MapResult<T> = Result<T, MapError>;

/// Errors raised by map kernels.
///
/// Inputs are never modified when a kernel fails; partially built output
/// tables are dropped before the error is returned.
#[derive(Debug, Error)]
pub enum MapError {
    /// Shape mismatch or illegal configuration.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// What was wrong.
        message: String,
    },

    /// A statistics primitive failed inside a map kernel.
    #[error("{kernel} failed: {source}")]
    Statistics {
        /// Name of the failing kernel.
        kernel: &'static str,
        /// Failure reported by the primitive.
        #[source]
        source: StatisticsFailure,
    },

    /// Cancelled at a cooperative check.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    /// Table access failed.
    #[error("table error: {0}")]
    Metric(#[from] MetricError),

    /// Variance smoothing failed.
    #[error("smoothing error: {0}")]
    Smooth(#[from] SmoothError),

    /// Cluster analysis failed.
    #[error("cluster error: {0}")]
    Cluster(#[from] ClusterError),

    /// Region-of-interest mask does not fit the mesh.
    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),
}

impl MapError {
    /// Create an [`MapError::InvalidInput`] error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Wrap a primitive failure with the name of the kernel it came from.
    #[must_use]
    pub const fn statistics(kernel: &'static str, source: StatisticsFailure) -> Self {
        Self::Statistics { kernel, source }
    }

    /// Whether this is a numerical degeneracy rather than bad input.
    #[must_use]
    pub fn is_convergence_failure(&self) -> bool {
        matches!(
            self,
            Self::Statistics {
                source: StatisticsFailure {
                    kind: FailureKind::ConvergenceFailure,
                    ..
                },
                ..
            }
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn statistics_message_names_kernel() {
        let err = MapError::statistics(
            "rank-sum t-map",
            StatisticsFailure::convergence("wrong group count"),
        );
        assert_eq!(
            err.to_string(),
            "rank-sum t-map failed: convergence failure: wrong group count"
        );
        assert!(err.is_convergence_failure());
        assert!(!MapError::invalid_input("x").is_convergence_failure());
    }

    #[test]
    fn cancelled_is_transparent() {
        let err = MapError::from(Cancelled);
        assert_eq!(err.to_string(), "operation cancelled");
    }
}
