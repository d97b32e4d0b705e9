//! Surface analytics toolkit for per-node data on triangulated meshes.
//!
//! This umbrella crate re-exports all surface-* crates, providing a unified
//! API for geodesic distances, per-node metric tables and permutation-based
//! statistical maps. All crates are Layer 0 (zero Bevy dependencies) and can
//! be used in CLI tools, servers, or batch pipelines.
//!
//! # Quick Start
//!
//! ```
//! use surface::prelude::*;
//!
//! let mesh = planar_grid(4, 4);
//!
//! // Distances from one corner along the mesh
//! let mut engine = GeodesicEngine::new(&mesh, GeodesicParams::new()).unwrap();
//! let tree = engine.single_source(0).unwrap();
//! assert_eq!(tree.distance(0), Some(0.0));
//!
//! // Two groups of subjects with a difference on node 0
//! let subject = |offset: f32, bump: f32| {
//!     let mut values = vec![offset; 16];
//!     values[0] += bump;
//!     Column::from_values("subject", values)
//! };
//! let a = MetricTable::from_columns(16, vec![subject(0.1, 5.0), subject(-0.1, 5.0)]).unwrap();
//! let b = MetricTable::from_columns(16, vec![subject(0.2, 0.0), subject(-0.2, 0.0)]).unwrap();
//!
//! let config = MapConfig::new().with_iterations(8).with_seed(1);
//! let analysis = two_sample_driver(
//!     &mesh,
//!     &a,
//!     &b,
//!     &config,
//!     &ClusterParams::new(),
//!     &Progress::silent(0),
//! )
//! .unwrap();
//! assert_eq!(analysis.report.clusters[0].nodes, vec![0]);
//! ```
//!
//! # Module Organization
//!
//! ## Foundation
//! - [`types`] - Mesh, region of interest, progress and cancellation
//! - [`stats`] - Statistics primitives: t-tests, FDR, ranks, regression, Levene
//!
//! ## Per-node Data
//! - [`metric`] - Metric tables, column algebra, aggregation and file formats
//! - [`smooth`] - Neighbor-average smoothing over the mesh
//! - [`geodesic`] - Geodesic distances along mesh edges
//!
//! ## Statistical Maps
//! - [`statmap`] - t-maps, permutation nulls, row-wise maps and drivers
//! - [`cluster`] - Cluster thresholding and significance reports
//!
//! # Feature Flags
//!
//! - `serde` - Serialization of configurations, parameters and reports

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Mesh, region of interest, progress and cancellation.
pub use surface_types as types;

/// Statistics primitives.
pub use surface_stats as stats;

/// Metric tables and file formats.
pub use surface_metric as metric;

/// Neighbor-average smoothing.
pub use surface_smooth as smooth;

/// Geodesic distances.
pub use surface_geodesic as geodesic;

/// Statistical maps and analysis drivers.
pub use surface_statmap as statmap;

/// Cluster thresholding.
pub use surface_cluster as cluster;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for surface analysis.
///
/// # Usage
///
/// ```
/// use surface::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use surface_types::{
        CancelToken, Progress, Roi, SurfaceMesh, corner_tetrahedron, planar_grid,
    };

    // Tables
    pub use surface_metric::{Column, MetricTable};

    // Smoothing and geodesics
    pub use surface_geodesic::{GeodesicEngine, GeodesicParams};
    pub use surface_smooth::{SmoothingParams, smooth_column};

    // Statistical maps
    pub use surface_cluster::{ClusterParams, ClusterReport};
    pub use surface_statmap::{
        MapAnalysis, MapConfig, one_sample_driver, t_map, two_sample_driver,
    };
}

// =============================================================================
// Tests
// =============================================================================
