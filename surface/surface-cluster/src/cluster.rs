//! Connected components of a thresholded map column.

use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use surface_metric::MetricTable;
use surface_types::{Point3, SurfaceMesh};
use tracing::debug;

use crate::error::{ClusterError, ClusterResult};
use crate::params::ClusterParams;

/// Sign of the threshold a cluster passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ClusterSign {
    /// Values above the positive threshold.
    Positive,
    /// Values below the negative threshold.
    Negative,
}

/// One connected set of active nodes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cluster {
    /// 1-based column of the map the cluster was found in.
    pub column: usize,
    /// Threshold side.
    pub sign: ClusterSign,
    /// Member nodes, ascending.
    pub nodes: Vec<u32>,
    /// Summed node area.
    pub area: f64,
    /// Area after correction; equals `area` without a correction column.
    pub corrected_area: f64,
    /// Mean position of the member nodes.
    pub center_of_gravity: Point3<f64>,
    /// Lower bound of the value range that qualified nodes.
    pub threshold_min: f32,
    /// Upper bound of the value range that qualified nodes.
    pub threshold_max: f32,
    /// Fraction of shuffled maxima larger than this cluster, or -1 when not
    /// scored.
    pub p_value: f64,
    /// Display name, `plus_cluster_...` or `minus_cluster_...`.
    pub name: String,
}

impl Cluster {
    /// Number of member nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Threshold shown in reports: the bound closest to zero.
    #[must_use]
    pub fn threshold(&self) -> f32 {
        match self.sign {
            ClusterSign::Positive => self.threshold_min,
            ClusterSign::Negative => self.threshold_max,
        }
    }

    /// Whether the corrected area reaches `significant_area`.
    #[must_use]
    pub fn is_significant(&self, significant_area: f64) -> bool {
        self.corrected_area >= significant_area
    }
}

/// Find every positive and negative cluster in `column` of `map`.
///
/// Components are grown breadth-first through mesh adjacency and only join
/// nodes that pass the same threshold. `areas` holds one area per node,
/// typically [`SurfaceMesh::node_areas`]. Clusters come back largest
/// corrected area first.
///
/// # Errors
///
/// - [`ClusterError::Metric`] if `column` does not exist
/// - [`ClusterError::NodeCountMismatch`] if the map or `areas` does not fit
///   the mesh
/// - [`ClusterError::InvalidInput`] for invalid parameters
pub fn find_clusters(
    mesh: &SurfaceMesh,
    areas: &[f64],
    map: &MetricTable,
    column: usize,
    params: &ClusterParams,
) -> ClusterResult<Vec<Cluster>> {
    let n = mesh.node_count();
    params.validate(n)?;
    for len in [map.node_count(), areas.len()] {
        if len != n {
            return Err(ClusterError::NodeCountMismatch {
                expected: n,
                actual: len,
            });
        }
    }
    let values = map.column_values(column)?;
    let mut clusters = components(mesh, areas, values, column + 1, params);
    sort_largest_first(&mut clusters);
    debug!(column, clusters = clusters.len(), "Clusters found");
    Ok(clusters)
}

pub(crate) fn sort_largest_first(clusters: &mut [Cluster]) {
    clusters.sort_by(|a, b| {
        b.corrected_area
            .total_cmp(&a.corrected_area)
            .then(a.column.cmp(&b.column))
            .then(a.nodes.cmp(&b.nodes))
    });
}

/// Components of one value column. Inputs are already validated.
pub(crate) fn components(
    mesh: &SurfaceMesh,
    areas: &[f64],
    values: &[f32],
    column: usize,
    params: &ClusterParams,
) -> Vec<Cluster> {
    let sign_of = |v: f32| {
        if v > params.positive_threshold {
            Some(ClusterSign::Positive)
        } else if v < params.negative_threshold {
            Some(ClusterSign::Negative)
        } else {
            None
        }
    };

    let mut visited = vec![false; values.len()];
    let mut queue = VecDeque::new();
    let mut clusters = Vec::new();
    for seed in 0..values.len() {
        if visited[seed] {
            continue;
        }
        let Some(sign) = sign_of(values[seed]) else {
            continue;
        };

        let mut nodes = Vec::new();
        visited[seed] = true;
        queue.push_back(seed);
        while let Some(node) = queue.pop_front() {
            nodes.push(node);
            for &nb in mesh.neighbors(node) {
                let nb = nb as usize;
                if !visited[nb] && sign_of(values[nb]) == Some(sign) {
                    visited[nb] = true;
                    queue.push_back(nb);
                }
            }
        }
        nodes.sort_unstable();
        clusters.push(build_cluster(mesh, areas, &nodes, sign, column, params));
    }
    clusters
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn build_cluster(
    mesh: &SurfaceMesh,
    areas: &[f64],
    nodes: &[usize],
    sign: ClusterSign,
    column: usize,
    params: &ClusterParams,
) -> Cluster {
    let coords = mesh.coordinates();
    let mut area = 0.0;
    let mut corrected_area = 0.0;
    let mut sum = Point3::<f64>::origin().coords;
    for &node in nodes {
        area += areas[node];
        corrected_area += match &params.area_correction {
            Some(correction) => areas[node] * 2f64.powf(f64::from(correction[node])),
            None => areas[node],
        };
        sum += coords[node].coords;
    }
    let center_of_gravity = Point3::from(sum / nodes.len().max(1) as f64);

    let (threshold_min, threshold_max, prefix) = match sign {
        ClusterSign::Positive => (params.positive_threshold, f32::MAX, "plus_"),
        ClusterSign::Negative => (-f32::MAX, params.negative_threshold, "minus_"),
    };
    let name = format!(
        "{prefix}cluster_area_{corrected_area:.6}_nodes_{}",
        nodes.len()
    );

    Cluster {
        column,
        sign,
        // Truncation: mesh construction caps node counts at u32
        nodes: nodes.iter().map(|&n| n as u32).collect(),
        area,
        corrected_area,
        center_of_gravity,
        threshold_min,
        threshold_max,
        p_value: -1.0,
        name,
    }
}
