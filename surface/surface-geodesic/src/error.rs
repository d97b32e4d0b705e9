//! Error types for geodesic distance computation.

use surface_metric::MetricError;
use surface_types::{Cancelled, MeshError};
use thiserror::Error;

/// Result type for geodesic operations.
pub type GeodesicResult<T> = Result<T, GeodesicError>;

/// Errors that can occur during geodesic computation.
#[derive(Debug, Error)]
pub enum GeodesicError {
    /// Node index outside the mesh.
    #[error("invalid node index: {index} (mesh has {node_count} nodes)")]
    InvalidInput {
        /// The invalid index.
        index: usize,
        /// Total number of nodes in the mesh.
        node_count: usize,
    },

    /// The source lies outside the ROI or has no neighbor inside it.
    #[error("node {node} cannot be a geodesic source: {reason}")]
    InvalidSource {
        /// Rejected source.
        node: usize,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The all-pairs distance matrix could not be allocated.
    #[error("cannot allocate a {node_count} x {node_count} distance matrix")]
    ResourceExhausted {
        /// Number of nodes.
        node_count: usize,
    },

    /// Cancelled through the progress hook or token.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),

    /// Internal bookkeeping found a node in no known set.
    #[error("internal error at node {node}: {message}")]
    ProgramError {
        /// Node being processed.
        node: usize,
        /// What was inconsistent.
        message: &'static str,
    },

    /// ROI mask does not fit the mesh.
    #[error("mesh error: {0}")]
    Mesh(#[from] MeshError),

    /// Writing distances into a table failed.
    #[error("table error: {0}")]
    Metric(#[from] MetricError),
}
