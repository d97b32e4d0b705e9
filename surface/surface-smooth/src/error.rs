//! Error types for smoothing.

use surface_metric::MetricError;
use surface_types::MeshError;
use thiserror::Error;

/// Result type for smoothing operations.
pub type SmoothResult<T> = Result<T, SmoothError>;

/// Errors raised by smoothing.
#[derive(Debug, Error)]
pub enum SmoothError {
    /// Strength outside `[0, 1]`.
    #[error("smoothing strength {strength} outside [0, 1]")]
    InvalidStrength {
        /// Offending strength.
        strength: f32,
    },

    /// Value buffer and mesh disagree on the node count.
    #[error("{actual} values for a mesh of {expected} nodes")]
    NodeCountMismatch {
        /// Mesh node count.
        expected: usize,
        /// Values offered.
        actual: usize,
    },

    /// Region-of-interest mask does not fit the mesh.
    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// Reading or writing the table failed.
    #[error("table error: {0}")]
    Metric(#[from] MetricError),
}
