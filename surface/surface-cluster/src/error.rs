//! Error types for cluster thresholding.

use surface_metric::MetricError;
use thiserror::Error;

/// Result type for cluster operations.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Errors that can occur during cluster thresholding.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Threshold, p-value or correction column out of range.
    #[error("invalid cluster parameter: {message}")]
    InvalidInput {
        /// What was wrong.
        message: String,
    },

    /// A per-node input does not have one entry per mesh node.
    #[error("node count mismatch: mesh has {expected} nodes, input has {actual}")]
    NodeCountMismatch {
        /// Number of mesh nodes.
        expected: usize,
        /// Length of the offending input.
        actual: usize,
    },

    /// Reading a map column failed.
    #[error("table error: {0}")]
    Metric(#[from] MetricError),
}

impl ClusterError {
    /// Create an [`ClusterError::InvalidInput`] error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
