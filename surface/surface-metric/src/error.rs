//! Error types for scalar table operations.

use surface_stats::StatisticsFailure;
use thiserror::Error;

/// Result type for table operations.
pub type MetricResult<T> = Result<T, MetricError>;

/// Errors raised by [`MetricTable`](crate::MetricTable) operations and codecs.
#[derive(Debug, Error)]
pub enum MetricError {
    /// Column index outside the table.
    #[error("column {column} out of range (table has {column_count} columns)")]
    ColumnOutOfRange {
        /// Requested column.
        column: usize,
        /// Number of columns.
        column_count: usize,
    },

    /// Node index outside the table.
    #[error("node {node} out of range (table has {node_count} nodes)")]
    NodeOutOfRange {
        /// Requested node.
        node: usize,
        /// Number of nodes.
        node_count: usize,
    },

    /// Two tables or a table and a buffer disagree on the node count.
    #[error("node count mismatch: expected {expected}, got {actual}")]
    NodeCountMismatch {
        /// Node count of the receiving table.
        expected: usize,
        /// Node count offered.
        actual: usize,
    },

    /// No column carries the requested name.
    #[error("no column named \"{name}\"")]
    ColumnNotFound {
        /// Requested name.
        name: String,
    },

    /// Illegal parameter or shape.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// What was wrong.
        message: String,
    },

    /// A statistics primitive failed while computing a column.
    #[error("statistics failure: {0}")]
    Statistics(#[from] StatisticsFailure),

    /// Malformed table file.
    #[error("invalid file content: {message}")]
    InvalidContent {
        /// Description of what was invalid.
        message: String,
    },

    /// Data ended before the declared shape was filled.
    #[error("unexpected end of data after {rows} of {expected} rows")]
    UnexpectedEof {
        /// Rows read.
        rows: usize,
        /// Rows declared.
        expected: usize,
    },

    /// I/O error from the standard library.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Float parsing error.
    #[error("float parsing error: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    /// Integer parsing error.
    #[error("integer parsing error: {0}")]
    ParseInt(#[from] std::num::ParseIntError),
}

impl MetricError {
    /// Create an `InvalidInput` error with the given message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an `InvalidContent` error with the given message.
    pub fn invalid_content(message: impl Into<String>) -> Self {
        Self::InvalidContent {
            message: message.into(),
        }
    }
}
