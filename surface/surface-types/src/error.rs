//! Error types for surface mesh construction.

use thiserror::Error;

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors raised while building or validating a surface mesh.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MeshError {
    /// A triangle references a node outside `[0, N)`.
    #[error("triangle {triangle} references node {index} (mesh has {node_count} nodes)")]
    InvalidIndex {
        /// Triangle position in the triangle list.
        triangle: usize,
        /// The out-of-range node index.
        index: u32,
        /// Number of nodes in the mesh.
        node_count: usize,
    },

    /// A triangle uses the same node more than once.
    #[error("triangle {triangle} repeats node {index}")]
    RepeatedVertex {
        /// Triangle position in the triangle list.
        triangle: usize,
        /// The repeated node index.
        index: u32,
    },

    /// A node coordinate is NaN or infinite.
    #[error("node {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Node index.
        index: usize,
    },

    /// A flat coordinate or index buffer is not a multiple of three.
    #[error("flat buffer of length {len} is not a multiple of 3")]
    MalformedBuffer {
        /// Buffer length.
        len: usize,
    },

    /// More nodes than a `u32` index can address.
    #[error("mesh has {count} nodes, more than u32 indices can address")]
    TooManyNodes {
        /// Node count.
        count: usize,
    },

    /// A region-of-interest mask does not match the mesh size.
    #[error("ROI mask has {actual} entries but the mesh has {expected} nodes")]
    RoiLength {
        /// Node count of the mesh.
        expected: usize,
        /// Length of the mask.
        actual: usize,
    },
}
